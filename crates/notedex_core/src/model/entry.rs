//! Entry and notebook identity types.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Internal entry id (`entries.eid`).
pub type EntryId = i64;

/// Internal notebook id (`notebooks.nid`).
pub type NotebookId = i64;

/// A named index term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub eid: EntryId,
    pub name: String,
}

/// Validation failures for entry names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// Names must contain at least one non-whitespace character.
    BlankName,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "entry name cannot be blank"),
        }
    }
}

impl Error for EntryValidationError {}

/// Checks that `name` can be stored as an entry name.
///
/// Names are stored verbatim; surrounding whitespace is not trimmed so that
/// lookup stays an exact match.
pub fn validate_entry_name(name: &str) -> Result<(), EntryValidationError> {
    if name.trim().is_empty() {
        return Err(EntryValidationError::BlankName);
    }
    Ok(())
}
