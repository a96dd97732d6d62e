//! Occurrence read models.

use crate::model::entry::NotebookId;
use crate::model::page::Page;
use serde::Serialize;

/// Where one occurrence of an entry lives.
///
/// Ordering of a list of locations is `(notebook_type, notebook_number,
/// page text)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceLocation {
    pub notebook_id: NotebookId,
    pub notebook_type: String,
    pub notebook_number: i64,
    pub page: Page,
}

/// Result of recording an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOccurrenceOutcome {
    /// A new occurrence row was inserted.
    Created,
    /// The `(page, notebook, entry)` triple was already recorded.
    AlreadyExists,
    /// The referenced notebook does not exist; nothing was written.
    NotebookNotFound,
}

impl AddOccurrenceOutcome {
    /// Returns `true` only when a row was inserted.
    pub fn is_created(self) -> bool {
        matches!(self, Self::Created)
    }
}
