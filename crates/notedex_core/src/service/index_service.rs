//! Index use-case service.
//!
//! # Responsibility
//! - Record occurrences, resolving notebooks and creating entries on demand.
//! - Rename, delete and coalesce entries.
//! - Expose proximity search over the same storage context.
//!
//! # Invariants
//! - The service never commits. Coalesce runs inside a savepoint that nests
//!   in the caller's transaction and is rolled back on error.
//! - A missing notebook on `add_occurrence` produces one warning and no
//!   writes.
//! - Pages are normalized before any row is written.

use crate::config::PageFormatConfig;
use crate::model::entry::{Entry, EntryId};
use crate::model::occurrence::{AddOccurrenceOutcome, OccurrenceLocation};
use crate::model::page::{normalize_page, Page};
use crate::repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
use crate::repo::notebook_repo::{NotebookLocator, SqliteNotebookLocator};
use crate::repo::occurrence_repo::{OccurrenceRepository, SqliteOccurrenceRepository};
use crate::search::proximity::{occurrences_around, ProximityHit, ProximityQuery, SearchResult};
use crate::service::warning::{LogWarningSink, WarningSink};
use log::{error, info, warn};
use rusqlite::Connection;
use std::time::Instant;

const COALESCE_SAVEPOINT: &str = "notedex_coalesce";

/// Summary of one coalesce run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalesceReport {
    /// Occurrence rows reassigned to the target entry.
    pub moved: usize,
    /// Rows left on the source after reassignment and then deleted
    /// (duplicates of target rows and stale redirect markers).
    pub dropped: usize,
    /// Whether a redirect marker was left on the source entry.
    pub redirected: bool,
}

/// Use-case facade over one index connection.
///
/// `conn` and `pages` form the storage context; notebook resolution and
/// warnings are injected collaborators.
pub struct IndexService<'conn, N = SqliteNotebookLocator<'conn>, W = LogWarningSink> {
    conn: &'conn Connection,
    pages: &'conn PageFormatConfig,
    entries: SqliteEntryRepository<'conn>,
    occurrences: SqliteOccurrenceRepository<'conn>,
    notebooks: N,
    warnings: W,
}

impl<'conn> IndexService<'conn> {
    /// Creates a service that resolves notebooks from the same database and
    /// logs warnings.
    pub fn try_new(conn: &'conn Connection, pages: &'conn PageFormatConfig) -> RepoResult<Self> {
        let notebooks = SqliteNotebookLocator::try_new(conn)?;
        Self::with_collaborators(conn, pages, notebooks, LogWarningSink)
    }
}

impl<'conn, N, W> IndexService<'conn, N, W>
where
    N: NotebookLocator,
    W: WarningSink,
{
    /// Creates a service with caller-provided collaborators.
    pub fn with_collaborators(
        conn: &'conn Connection,
        pages: &'conn PageFormatConfig,
        notebooks: N,
        warnings: W,
    ) -> RepoResult<Self> {
        Ok(Self {
            conn,
            pages,
            entries: SqliteEntryRepository::try_new(conn)?,
            occurrences: SqliteOccurrenceRepository::try_new(conn)?,
            notebooks,
            warnings,
        })
    }

    /// Exact-match entry lookup.
    pub fn lookup_entry(&self, name: &str) -> RepoResult<Option<EntryId>> {
        self.entries.lookup(name)
    }

    pub fn get_entry(&self, eid: EntryId) -> RepoResult<Option<Entry>> {
        self.entries.get(eid)
    }

    /// Pre-creates an entry without any occurrence.
    pub fn create_entry(&self, name: &str) -> RepoResult<EntryId> {
        self.entries.create(name)
    }

    /// Records that `entry_name` occurs on `raw_page` of a notebook.
    ///
    /// # Contract
    /// - Unknown notebook: warns, writes nothing, returns `NotebookNotFound`.
    /// - Unknown entry: the entry is created.
    /// - Existing `(page, notebook, entry)`: returns `AlreadyExists`.
    ///
    /// # Errors
    /// - [`RepoError::Format`] when `raw_page` cannot be normalized; nothing is
    ///   written.
    pub fn add_occurrence(
        &self,
        entry_name: &str,
        notebook_type: &str,
        notebook_number: i64,
        raw_page: &str,
    ) -> RepoResult<AddOccurrenceOutcome> {
        let Some(nid) = self
            .notebooks
            .resolve_notebook(notebook_type, notebook_number)?
        else {
            self.warnings.warn(&format!(
                "notebook {notebook_type} {notebook_number} does not exist"
            ));
            warn!("event=occurrence_add module=service status=skipped reason=notebook_not_found");
            return Ok(AddOccurrenceOutcome::NotebookNotFound);
        };

        let page = normalize_page(raw_page, notebook_type, self.pages)?;
        let eid = self.entries.lookup_or_create(entry_name)?;
        let outcome = if self.occurrences.insert_if_absent(&page, nid, eid)? {
            AddOccurrenceOutcome::Created
        } else {
            AddOccurrenceOutcome::AlreadyExists
        };

        info!(
            "event=occurrence_add module=service status=ok created={}",
            outcome.is_created()
        );
        Ok(outcome)
    }

    /// Locations of an entry, sorted by `(ntype, nnum, page)`.
    pub fn fetch_occurrences(&self, eid: EntryId) -> RepoResult<Vec<OccurrenceLocation>> {
        self.occurrences.fetch_for_entry(eid)
    }

    /// Entries occurring on or near a page. See [`occurrences_around`].
    pub fn occurrences_around(&self, query: &ProximityQuery) -> SearchResult<Vec<ProximityHit>> {
        occurrences_around(self.conn, &self.notebooks, self.pages, query)
    }

    /// Fixes the text of an entry in place.
    ///
    /// # Errors
    /// - [`RepoError::EntryNotFound`] when `old_name` is unknown.
    /// - [`RepoError::DuplicateEntry`] when `new_name` belongs to another entry;
    ///   use [`Self::coalesce_entry`] to merge instead.
    pub fn correct_entry(&self, old_name: &str, new_name: &str) -> RepoResult<()> {
        self.entries.rename(old_name, new_name)?;
        info!("event=entry_rename module=service status=ok");
        Ok(())
    }

    /// Deletes an entry and its occurrences. Unknown ids are ignored.
    pub fn delete_entry(&self, eid: EntryId) -> RepoResult<()> {
        self.entries.delete(eid)?;
        info!("event=entry_delete module=service status=ok");
        Ok(())
    }

    /// Merges `from_name` into `to_name`.
    ///
    /// Every page occurrence of `from_name` moves to `to_name`. With
    /// `redirect`, `from_name` keeps exactly one occurrence, a
    /// `"moved to <TO_NAME>"` marker in the notebook of its first location;
    /// without it, `from_name` is deleted.
    ///
    /// Re-running a successful redirecting coalesce leaves the index as it
    /// was.
    ///
    /// # Errors
    /// - [`RepoError::EntryNotFound`] when either entry is unknown.
    /// - [`RepoError::CoalesceIntoSelf`] when both names are the same entry.
    /// - [`RepoError::NoOccurrenceToRedirect`] when `redirect` is set and
    ///   `from_name` has no occurrence.
    ///
    /// All three are raised before anything is written.
    pub fn coalesce_entry(
        &self,
        from_name: &str,
        to_name: &str,
        redirect: bool,
    ) -> RepoResult<CoalesceReport> {
        let started_at = Instant::now();
        let from_eid = self.require_entry(from_name)?;
        let to_eid = self.require_entry(to_name)?;
        if from_eid == to_eid {
            return Err(RepoError::CoalesceIntoSelf(from_name.to_string()));
        }

        let anchor = if redirect {
            let first = self
                .occurrences
                .fetch_for_entry(from_eid)?
                .into_iter()
                .next()
                .ok_or_else(|| RepoError::NoOccurrenceToRedirect(from_name.to_string()))?;
            Some(first)
        } else {
            None
        };

        let result = self.in_savepoint(|| {
            let moved = self.occurrences.reassign(from_eid, to_eid)?;
            let dropped = self.occurrences.delete_for_entry(from_eid)?;

            match &anchor {
                Some(location) => {
                    let marker_eid = self.entries.lookup_or_create(from_name)?;
                    self.occurrences.insert_if_absent(
                        &Page::redirect_to(to_name),
                        location.notebook_id,
                        marker_eid,
                    )?;
                }
                None => self.entries.delete(from_eid)?,
            }

            Ok(CoalesceReport {
                moved,
                dropped,
                redirected: anchor.is_some(),
            })
        });

        match &result {
            Ok(report) => info!(
                "event=entry_coalesce module=service status=ok duration_ms={} moved={} dropped={} redirect={}",
                started_at.elapsed().as_millis(),
                report.moved,
                report.dropped,
                report.redirected
            ),
            Err(err) => error!(
                "event=entry_coalesce module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn require_entry(&self, name: &str) -> RepoResult<EntryId> {
        self.entries
            .lookup(name)?
            .ok_or_else(|| RepoError::EntryNotFound(name.to_string()))
    }

    fn in_savepoint<T>(&self, work: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
        self.conn
            .execute_batch(&format!("SAVEPOINT {COALESCE_SAVEPOINT};"))?;
        match work() {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE {COALESCE_SAVEPOINT};"))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO {COALESCE_SAVEPOINT}; RELEASE {COALESCE_SAVEPOINT};"
                )) {
                    error!(
                        "event=savepoint_rollback module=service status=error error={}",
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}
