//! Core library of the cotonetes note exporter/importer.
//!
//! Converts notes between a markdown-like body stored in SQLite and LaTeX
//! record files, in both directions.

pub mod convert;
pub mod db;
pub mod files;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use convert::{
    body_to_latex, body_to_markdown, parse_document, parse_records, render_document,
    render_record, render_section_header, RecordError, RecordResult,
};
pub use logging::{default_log_level, init_logging};
pub use model::note::{FileNotes, Note, NoteValidationError};
pub use repo::note_repo::{
    Category, CategoryId, NoteId, NoteRepository, RepoError, RepoResult, SqliteNoteRepository,
};
pub use service::error::{ServiceError, ServiceResult};
pub use service::export_service::{export_notes, run_export, ExportOptions, ExportSummary};
pub use service::import_service::{
    import_files, parse_notes_file, read_notes_tree, run_import, store_file_notes, ImportOptions,
    ImportSummary,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
