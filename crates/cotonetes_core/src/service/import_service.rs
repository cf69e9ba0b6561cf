//! Import use case: LaTeX file tree -> note store.
//!
//! # Responsibility
//! - Parse every `.tex` file under a directory into `FileNotes`.
//! - Store all categories, notes and links in one transaction.
//!
//! # Invariants
//! - The first malformed record aborts the run before anything is stored.
//! - A storage failure rolls back the whole import.

use crate::convert::parse_document;
use crate::db::open_db;
use crate::files::{category_for_file, discover_files, LATEX_EXTENSION};
use crate::model::note::FileNotes;
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::service::error::{ServiceError, ServiceResult};
use log::{error, info};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs of an import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Target SQLite note store; created when absent.
    pub db_path: PathBuf,
    /// Root of the LaTeX tree to read.
    pub notes_dir: PathBuf,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Distinct categories touched, in discovery order.
    pub categories: Vec<String>,
    pub notes: usize,
}

/// Reads the LaTeX tree and stores it in the database at `db_path`.
///
/// Deciding what to do with a pre-existing database is left to the caller.
/// Callers that replace an existing database should run `read_notes_tree`
/// first and hand its result to `import_files`, so a bad input tree leaves
/// the old database in place.
pub fn run_import(options: &ImportOptions) -> ServiceResult<ImportSummary> {
    let files = read_notes_tree(&options.notes_dir)?;
    import_files(options, &files)
}

/// Stores an already parsed tree in the database at `db_path`.
pub fn import_files(options: &ImportOptions, files: &[FileNotes]) -> ServiceResult<ImportSummary> {
    let mut conn = open_db(&options.db_path)?;
    store_file_notes(&mut conn, &options.notes_dir, files)
}

/// Parses every LaTeX file found under `root`.
pub fn read_notes_tree(root: &Path) -> ServiceResult<Vec<FileNotes>> {
    if !root.is_dir() {
        return Err(ServiceError::MissingPath(root.to_path_buf()));
    }

    let paths = discover_files(root, LATEX_EXTENSION).map_err(|err| {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        ServiceError::io(path, err.into())
    })?;

    paths.iter().map(|path| parse_notes_file(path)).collect()
}

/// Parses one LaTeX file into its notes.
pub fn parse_notes_file(path: &Path) -> ServiceResult<FileNotes> {
    let text = fs::read_to_string(path).map_err(|err| ServiceError::io(path, err))?;
    let notes = parse_document(&text).map_err(|source| {
        error!(
            "event=import_file module=service status=error path={} error={}",
            path.display(),
            source
        );
        ServiceError::Record {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!(
        "event=import_file module=service status=ok path={} notes={}",
        path.display(),
        notes.len()
    );
    Ok(FileNotes {
        source: path.display().to_string(),
        notes,
    })
}

/// Stores parsed files in one transaction.
///
/// Each file maps to the category of its directory; files sharing a
/// directory share the category.
pub fn store_file_notes(
    conn: &mut Connection,
    root: &Path,
    files: &[FileNotes],
) -> ServiceResult<ImportSummary> {
    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();
    {
        let repo = SqliteNoteRepository::try_new(&tx)?;
        for file in files {
            let category = category_for_file(root, &PathBuf::from(&file.source));
            let category_id = repo.ensure_category(&category)?;
            for note in &file.notes {
                let note_id = repo.add_note(note)?;
                repo.link_note_category(note_id, category_id)?;
            }
            summary.notes += file.notes.len();
            if !summary.categories.contains(&category) {
                summary.categories.push(category);
            }
        }
    }
    tx.commit()?;

    info!(
        "event=import_store module=service status=ok categories={} notes={}",
        summary.categories.len(),
        summary.notes
    );
    Ok(summary)
}
