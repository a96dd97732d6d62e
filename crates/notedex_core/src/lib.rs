//! Core of the notedex cross-reference index.
//!
//! Entries (index terms) occur on pages of numbered notebooks. This crate
//! owns the entry/occurrence data, page normalization, proximity search and
//! entry coalescing. Notebook management and user interfaces live elsewhere.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, PageFormatConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Entry, EntryId, EntryValidationError, NotebookId};
pub use model::occurrence::{AddOccurrenceOutcome, OccurrenceLocation};
pub use model::page::{
    max_page_number, normalize_page, normalize_page_number, Page, PageFormatError,
};
pub use repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
pub use repo::notebook_repo::{NotebookLocator, SqliteNotebookLocator};
pub use repo::occurrence_repo::{OccurrenceRepository, SqliteOccurrenceRepository};
pub use search::proximity::{
    occurrences_around, ProximityHit, ProximityQuery, SearchError, SearchResult,
};
pub use service::index_service::{CoalesceReport, IndexService};
pub use service::warning::{LogWarningSink, WarningSink};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
