//! Export use case: note store -> LaTeX file tree.
//!
//! # Responsibility
//! - Write one `.tex` file per category under the output directory.
//!
//! # Invariants
//! - The output directory must already exist; category subdirectories are
//!   created as needed.
//! - Categories are exported in id order, notes in note id order.
//! - A failure mid-run may leave the file being written truncated.

use crate::convert::render_document;
use crate::db::open_db;
use crate::files::{category_depth, category_leaf, export_target};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::service::error::{ServiceError, ServiceResult};
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Inputs of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Existing SQLite note store.
    pub db_path: PathBuf,
    /// Existing directory receiving the LaTeX tree.
    pub notes_dir: PathBuf,
}

/// Outcome of an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Written files, in export order.
    pub files: Vec<PathBuf>,
    pub notes: usize,
}

/// Opens the note store and exports it.
///
/// # Errors
/// - `MissingPath` when the database or the output directory does not exist.
pub fn run_export(options: &ExportOptions) -> ServiceResult<ExportSummary> {
    require_exists(&options.notes_dir)?;
    require_exists(&options.db_path)?;

    let conn = open_db(&options.db_path)?;
    let repo = SqliteNoteRepository::try_new(&conn)?;
    export_notes(&repo, &options.notes_dir)
}

/// Exports every category of `repo` into `out_dir`.
pub fn export_notes<R: NoteRepository>(repo: &R, out_dir: &Path) -> ServiceResult<ExportSummary> {
    require_exists(out_dir)?;

    let mut summary = ExportSummary::default();
    for category in repo.list_categories()? {
        let notes = repo.list_notes_in_category(category.id)?;
        let target = export_target(out_dir, &category.name);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|err| ServiceError::io(dir, err))?;
        }

        let lines = render_document(
            category_leaf(&category.name),
            category_depth(&category.name),
            &notes,
        );
        write_lines(&target, &lines)?;

        info!(
            "event=export_file module=service status=ok path={} notes={}",
            target.display(),
            notes.len()
        );
        summary.notes += notes.len();
        summary.files.push(target);
    }

    Ok(summary)
}

fn write_lines(path: &Path, lines: &[String]) -> ServiceResult<()> {
    let file = File::create(path).map_err(|err| ServiceError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}").map_err(|err| ServiceError::io(path, err))?;
    }
    writer.flush().map_err(|err| ServiceError::io(path, err))
}

fn require_exists(path: &Path) -> ServiceResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ServiceError::MissingPath(path.to_path_buf()))
    }
}
