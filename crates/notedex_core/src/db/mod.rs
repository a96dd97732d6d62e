//! Index database bootstrap.
//!
//! Opens the SQLite file that holds notebooks, entries and occurrences, and
//! brings its schema up to the version this crate writes.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`; the index never writes
//!   to a database whose version is newer than [`migrations::latest_version`].
//! - Callers own the returned connection and lend it to repositories.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage failure below the repository layer.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The index file was written by a newer notedex.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "index storage error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "index was created by a newer notedex (schema {found}, this build reads up to {supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
