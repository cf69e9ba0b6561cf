//! Export/import use-case services.
//!
//! # Responsibility
//! - Orchestrate storage, file-tree and converter calls into the two
//!   commands exposed by the CLI.
//! - Keep CLI code decoupled from storage and conversion details.

pub mod error;
pub mod export_service;
pub mod import_service;
