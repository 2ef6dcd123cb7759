//! Notes database: connection setup and schema versioning.
//!
//! Every connection handed out by [`open_db`] or [`open_db_in_memory`] has the
//! notes and audit tables migrated to [`migrations::latest_version`]. A file
//! written by a newer build is refused instead of being opened read-write.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure while opening, migrating, or querying the notes database.
#[derive(Debug)]
pub enum StorageError {
    /// Error reported by SQLite itself.
    Sqlite(rusqlite::Error),
    /// The file carries a schema this build does not know.
    SchemaTooNew { found: u32, supported: u32 },
}

impl StorageError {
    /// Stable `Type::Variant` label used in audit failure records.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "StorageError::Sqlite",
            Self::SchemaTooNew { .. } => "StorageError::SchemaTooNew",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "notes database is at schema v{found}, this build supports up to v{supported}"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
