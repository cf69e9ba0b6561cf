//! Bidirectional note-body converter between markdown-like text and LaTeX.
//!
//! # Responsibility
//! - Escape/unescape LaTeX special characters.
//! - Substitute inline bold and link spans.
//! - Drive the block state machines over whole bodies.
//! - Render and parse full note records.
//!
//! # Invariants
//! - Every function here is pure; patterns are compiled once and never
//!   mutated.

pub mod block;
pub mod escape;
pub mod inline;
pub mod record;

pub use block::{body_to_latex, body_to_markdown, BlockState, LineKind, Transition};
pub use escape::{escape, unescape};
pub use record::{
    parse_document, parse_records, render_document, render_record, render_section_header,
    RecordError, RecordResult,
};
