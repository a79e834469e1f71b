//! SQLite store that backs the `books` and `requests` collections.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection is handed out only after `kv_store` carries every column
//!   the collection store reads and writes.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build than this one.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// `kv_store` is absent or lacks columns even though `user_version`
    /// claims the schema is current.
    StoreTableMismatch { missing_columns: Vec<&'static str> },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "library store schema v{found} is newer than this build (v{supported})"
            ),
            Self::StoreTableMismatch { missing_columns } => write!(
                f,
                "kv_store table is missing columns: {}",
                missing_columns.join(", ")
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
