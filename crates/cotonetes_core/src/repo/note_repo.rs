//! Category/note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes, categories and their links in the three-table schema.
//! - Read notes back grouped by category for export.
//!
//! # Invariants
//! - Write paths call `Note::validate()` before SQL mutations.
//! - Bodies are stored as one text column joined with `\n`.
//! - Date columns are returned as text whatever storage class SQLite chose.

use crate::db::DbError;
use crate::model::note::{Note, NoteValidationError};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Row id of a category.
pub type CategoryId = i64;
/// Row id of a note.
pub type NoteId = i64;

/// Repository error for note/category persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored category, e.g. `work/projects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Repository interface for the note store.
pub trait NoteRepository {
    /// Returns the id of the named category, inserting it when absent.
    fn ensure_category(&self, name: &str) -> RepoResult<CategoryId>;
    /// Inserts one note and returns its id.
    fn add_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Links a note to a category.
    fn link_note_category(&self, note_id: NoteId, category_id: CategoryId) -> RepoResult<()>;
    /// Lists all categories ordered by id.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Lists the notes linked to one category ordered by note id.
    fn list_notes_in_category(&self, category_id: CategoryId) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository.
///
/// Works over a plain connection or, through deref, over an open
/// `rusqlite::Transaction`.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn ensure_category(&self, name: &str) -> RepoResult<CategoryId> {
        self.conn.execute(
            "INSERT INTO categories (category) VALUES (?1)
             ON CONFLICT(category) DO NOTHING;",
            [name],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM categories WHERE category = ?1;",
            [name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn add_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (title, url, created, last_updated, note)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.title.as_str(),
                note.url.as_str(),
                note.created.as_str(),
                note.updated.as_str(),
                note.body_text(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn link_note_category(&self, note_id: NoteId, category_id: CategoryId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO note_categories (note_id, category_id) VALUES (?1, ?2);",
            params![note_id, category_id],
        )?;
        Ok(())
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, category FROM categories ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(Category {
                id: row.get("id")?,
                name: row.get("category")?,
            });
        }
        Ok(categories)
    }

    fn list_notes_in_category(&self, category_id: CategoryId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                notes.id,
                notes.title,
                notes.url,
                notes.created,
                notes.last_updated,
                notes.note
             FROM notes
             INNER JOIN note_categories ON notes.id = note_categories.note_id
             WHERE note_categories.category_id = ?1
             ORDER BY notes.id ASC;",
        )?;
        let mut rows = stmt.query([category_id])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: NoteId = row.get("id")?;
    let created = text_column(row, "created")?;
    let updated = text_column(row, "last_updated")?;
    let body: String = row.get("note")?;
    Note::from_stored(
        row.get::<_, String>("title")?,
        row.get::<_, String>("url")?,
        created,
        updated,
        &body,
    )
    .map_err(|err| RepoError::InvalidData(format!("note {id}: {err}")))
}

// `created`/`last_updated` are declared INTEGER, so numeric-looking tokens come
// back as integers or reals.
fn text_column(row: &Row<'_>, column: &str) -> RepoResult<String> {
    match row.get::<_, Value>(column)? {
        Value::Text(value) => Ok(value),
        Value::Integer(value) => Ok(value.to_string()),
        Value::Real(value) => Ok(value.to_string()),
        Value::Null => Err(RepoError::InvalidData(format!(
            "column `{column}` is null"
        ))),
        Value::Blob(_) => Err(RepoError::InvalidData(format!(
            "column `{column}` holds a blob"
        ))),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["categories", "notes", "note_categories"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::InvalidData(format!(
                "required table `{table}` is missing"
            )));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
