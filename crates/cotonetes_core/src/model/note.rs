//! Note domain model.
//!
//! # Responsibility
//! - Define the unit exchanged between storage and the LaTeX converter.
//! - Group notes recovered from one input file.
//!
//! # Invariants
//! - `title` is non-empty.
//! - `url`, `created` and `updated` are opaque and passed through unchanged.
//! - `body` keeps insertion order; each entry is one line without `\n`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One exported/imported note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    /// Stored verbatim; never escaped in either direction.
    pub url: String,
    /// Opaque creation token.
    pub created: String,
    /// Opaque last-update token. Serialized as `last_updated` to match storage.
    #[serde(rename = "last_updated")]
    pub updated: String,
    /// Markdown-like body, one entry per line.
    pub body: Vec<String>,
}

impl Note {
    /// Creates a validated note.
    ///
    /// # Errors
    /// - Returns `NoteValidationError::EmptyTitle` when `title` is blank.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        created: impl Into<String>,
        updated: impl Into<String>,
        body: Vec<String>,
    ) -> Result<Self, NoteValidationError> {
        let note = Self {
            title: title.into(),
            url: url.into(),
            created: created.into(),
            updated: updated.into(),
            body,
        };
        note.validate()?;
        Ok(note)
    }

    /// Builds a note from a stored body text, splitting it on `\n`.
    pub fn from_stored(
        title: impl Into<String>,
        url: impl Into<String>,
        created: impl Into<String>,
        updated: impl Into<String>,
        body_text: &str,
    ) -> Result<Self, NoteValidationError> {
        let body = body_text.split('\n').map(str::to_string).collect();
        Self::new(title, url, created, updated, body)
    }

    /// Joins the body back into the single text column used by storage.
    pub fn body_text(&self) -> String {
        self.body.join("\n")
    }

    /// Validates model invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// All notes recovered from one LaTeX input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNotes {
    /// Path (or other identifier) of the source fragment.
    pub source: String,
    pub notes: Vec<Note>,
}

/// Model validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}
