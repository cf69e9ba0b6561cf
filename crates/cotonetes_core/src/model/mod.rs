//! Domain model shared by the converter, storage and services.
//!
//! # Responsibility
//! - Define the `Note` record and its per-file grouping.
//!
//! # Invariants
//! - A `Note` is immutable once constructed and validated.

pub mod note;
