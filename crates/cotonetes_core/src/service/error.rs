//! Error type shared by the export/import use cases.

use crate::convert::RecordError;
use crate::db::DbError;
use crate::repo::note_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of an export or import run. Every variant is terminal.
#[derive(Debug)]
pub enum ServiceError {
    /// A required input directory or file does not exist.
    MissingPath(PathBuf),
    /// File open/create/read/write failure.
    Io { path: PathBuf, source: io::Error },
    /// A LaTeX input file holds a malformed record.
    Record { path: PathBuf, source: RecordError },
    Repo(RepoError),
    Db(DbError),
}

impl ServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPath(path) => write!(f, "path does not exist: {}", path.display()),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Record { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingPath(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Record { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
