//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the note store and audit store contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Note writes must pass `Note::validate()` before persistence.
//! - The audit store exposes append only; no update or delete path exists.
//! - Repositories borrow a `Connection`, so a caller-owned transaction can
//!   span several stores.

use crate::db::StorageError;
use crate::model::note::{NoteId, NoteValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod audit_repo;
pub mod note_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by the note and audit stores.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Storage(StorageError),
    NotFound(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Stable `Type::Variant` label; storage failures report the storage variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "RepoError::Validation",
            Self::Storage(err) => err.kind_name(),
            Self::NotFound(_) => "RepoError::NotFound",
            Self::InvalidData(_) => "RepoError::InvalidData",
            Self::MissingRequiredTable(_) => "RepoError::MissingRequiredTable",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Sqlite(value))
    }
}

pub(crate) fn ensure_table_exists(
    conn: &rusqlite::Connection,
    table: &'static str,
) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(table))
    }
}
