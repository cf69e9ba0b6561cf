//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract consumed by the export/import services.
//! - Isolate SQLite query details from service orchestration.

pub mod note_repo;
