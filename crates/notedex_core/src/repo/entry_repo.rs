//! Entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own lookup, lookup-or-create, rename and cascading delete of entries.
//! - Define the repository error shared by every index repository.
//!
//! # Invariants
//! - Entry names are unique; this repository never inserts a duplicate.
//! - Deleting an entry removes its occurrences first.
//! - Deleting an unknown entry is a no-op.

use crate::db::DbError;
use crate::model::entry::{validate_entry_name, Entry, EntryId, EntryValidationError};
use crate::model::page::PageFormatError;
use crate::repo::ensure_connection_ready;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for entry/occurrence persistence and index use-cases.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Page could not be normalized.
    Format(PageFormatError),
    InvalidEntryName(EntryValidationError),
    /// No entry carries this name.
    EntryNotFound(String),
    /// Another entry already carries this name.
    DuplicateEntry(String),
    /// Redirecting coalesce on an entry with no occurrence to anchor the marker.
    NoOccurrenceToRedirect(String),
    /// Coalesce source and target are the same entry.
    CoalesceIntoSelf(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Format(err) => write!(f, "{err}"),
            Self::InvalidEntryName(err) => write!(f, "{err}"),
            Self::EntryNotFound(name) => write!(f, "entry not found: `{name}`"),
            Self::DuplicateEntry(name) => write!(f, "entry already exists: `{name}`"),
            Self::NoOccurrenceToRedirect(name) => write!(
                f,
                "entry `{name}` has no occurrence to leave a redirect at"
            ),
            Self::CoalesceIntoSelf(name) => {
                write!(f, "cannot coalesce entry `{name}` into itself")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "index repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "index repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted index data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Format(err) => Some(err),
            Self::InvalidEntryName(err) => Some(err),
            _ => None,
        }
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

impl From<PageFormatError> for RepoError {
    fn from(value: PageFormatError) -> Self {
        Self::Format(value)
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::InvalidEntryName(value)
    }
}

/// Repository interface for entry operations.
pub trait EntryRepository {
    /// Exact-match lookup; `None` when absent.
    fn lookup(&self, name: &str) -> RepoResult<Option<EntryId>>;
    fn get(&self, eid: EntryId) -> RepoResult<Option<Entry>>;
    /// Inserts a new entry. Fails with `DuplicateEntry` when the name is taken.
    fn create(&self, name: &str) -> RepoResult<EntryId>;
    /// Renames `old_name` in place; eid and occurrences are untouched.
    fn rename(&self, old_name: &str, new_name: &str) -> RepoResult<()>;
    /// Removes the entry and all of its occurrences.
    fn delete(&self, eid: EntryId) -> RepoResult<()>;

    /// Returns the eid for `name`, creating the entry when it is unknown.
    ///
    /// Not atomic; relies on the single-writer model.
    fn lookup_or_create(&self, name: &str) -> RepoResult<EntryId> {
        match self.lookup(name)? {
            Some(eid) => Ok(eid),
            None => self.create(name),
        }
    }
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["entries", "occurrences"])?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn lookup(&self, name: &str) -> RepoResult<Option<EntryId>> {
        let eid = self
            .conn
            .query_row(
                "SELECT eid FROM entries WHERE name = ?1;",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(eid)
    }

    fn get(&self, eid: EntryId) -> RepoResult<Option<Entry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT eid, name FROM entries WHERE eid = ?1;",
                [eid],
                |row| {
                    Ok(Entry {
                        eid: row.get("eid")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn create(&self, name: &str) -> RepoResult<EntryId> {
        validate_entry_name(name)?;
        if self.lookup(name)?.is_some() {
            return Err(RepoError::DuplicateEntry(name.to_string()));
        }

        self.conn
            .execute("INSERT INTO entries (name) VALUES (?1);", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn rename(&self, old_name: &str, new_name: &str) -> RepoResult<()> {
        validate_entry_name(new_name)?;
        let Some(eid) = self.lookup(old_name)? else {
            return Err(RepoError::EntryNotFound(old_name.to_string()));
        };
        if old_name == new_name {
            return Ok(());
        }
        if self.lookup(new_name)?.is_some() {
            return Err(RepoError::DuplicateEntry(new_name.to_string()));
        }

        self.conn.execute(
            "UPDATE entries SET name = ?1 WHERE eid = ?2;",
            params![new_name, eid],
        )?;
        Ok(())
    }

    fn delete(&self, eid: EntryId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM occurrences WHERE eid = ?1;", [eid])?;
        self.conn
            .execute("DELETE FROM entries WHERE eid = ?1;", [eid])?;
        Ok(())
    }
}
