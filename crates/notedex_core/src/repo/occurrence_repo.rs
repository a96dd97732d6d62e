//! Occurrence store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create, check and list `(page, notebook, entry)` associations.
//! - Provide the bulk reassignment/delete primitives used by coalesce.
//!
//! # Invariants
//! - `(page, nid, eid)` is unique; inserting an existing triple is refused by
//!   `insert_if_absent` and by the schema.
//! - Listings are sorted by `(ntype, nnum, page)` as plain strings/integers;
//!   correct numeric order relies on pages being normalized at insert time.

use crate::model::entry::{EntryId, NotebookId};
use crate::model::occurrence::OccurrenceLocation;
use crate::model::page::Page;
use crate::repo::ensure_connection_ready;
use crate::repo::entry_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Internal occurrence id (`occurrences.oid`).
pub type OccurrenceId = i64;

/// Repository interface for occurrence rows.
pub trait OccurrenceRepository {
    fn exists(&self, page: &Page, nid: NotebookId, eid: EntryId) -> RepoResult<bool>;
    fn insert(&self, page: &Page, nid: NotebookId, eid: EntryId) -> RepoResult<OccurrenceId>;
    /// Locations of every occurrence of `eid`, sorted by `(ntype, nnum, page)`.
    fn fetch_for_entry(&self, eid: EntryId) -> RepoResult<Vec<OccurrenceLocation>>;
    fn count_for_entry(&self, eid: EntryId) -> RepoResult<u64>;
    /// Moves page occurrences from one entry to another in a single statement.
    ///
    /// Redirect markers stay on `from_eid`, as do rows that would duplicate an
    /// existing `(page, nid, to_eid)` triple. Returns the number of rows moved.
    fn reassign(&self, from_eid: EntryId, to_eid: EntryId) -> RepoResult<usize>;
    /// Returns the number of rows removed.
    fn delete_for_entry(&self, eid: EntryId) -> RepoResult<usize>;

    /// Inserts unless the triple already exists. Returns `true` on insert.
    fn insert_if_absent(&self, page: &Page, nid: NotebookId, eid: EntryId) -> RepoResult<bool> {
        if self.exists(page, nid, eid)? {
            return Ok(false);
        }
        self.insert(page, nid, eid)?;
        Ok(true)
    }
}

/// SQLite-backed occurrence store.
pub struct SqliteOccurrenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOccurrenceRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["notebooks", "entries", "occurrences"])?;
        Ok(Self { conn })
    }
}

impl OccurrenceRepository for SqliteOccurrenceRepository<'_> {
    fn exists(&self, page: &Page, nid: NotebookId, eid: EntryId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM occurrences
                WHERE page = ?1 AND nid = ?2 AND eid = ?3
            );",
            params![page.as_str(), nid, eid],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert(&self, page: &Page, nid: NotebookId, eid: EntryId) -> RepoResult<OccurrenceId> {
        self.conn.execute(
            "INSERT INTO occurrences (page, page_kind, nid, eid) VALUES (?1, ?2, ?3, ?4);",
            params![page.as_str(), page.kind_to_db(), nid, eid],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn fetch_for_entry(&self, eid: EntryId) -> RepoResult<Vec<OccurrenceLocation>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                n.nid AS nid,
                n.ntype AS ntype,
                n.nnum AS nnum,
                o.page AS page,
                o.page_kind AS page_kind
             FROM occurrences o
             INNER JOIN notebooks n ON n.nid = o.nid
             WHERE o.eid = ?1
             ORDER BY n.ntype ASC, n.nnum ASC, o.page ASC, o.oid ASC;",
        )?;
        let mut rows = stmt.query([eid])?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next()? {
            locations.push(parse_location_row(row)?);
        }
        Ok(locations)
    }

    fn count_for_entry(&self, eid: EntryId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM occurrences WHERE eid = ?1;",
            [eid],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative occurrence count {count}")))
    }

    fn reassign(&self, from_eid: EntryId, to_eid: EntryId) -> RepoResult<usize> {
        let moved = self.conn.execute(
            "UPDATE OR IGNORE occurrences
             SET eid = ?1
             WHERE eid = ?2
               AND page_kind = 'page';",
            params![to_eid, from_eid],
        )?;
        Ok(moved)
    }

    fn delete_for_entry(&self, eid: EntryId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM occurrences WHERE eid = ?1;", [eid])?;
        Ok(removed)
    }
}

fn parse_location_row(row: &Row<'_>) -> RepoResult<OccurrenceLocation> {
    let kind: String = row.get("page_kind")?;
    let text: String = row.get("page")?;
    let page = Page::from_db(&kind, text.clone()).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid page `{text}` of kind `{kind}` in occurrences.page"
        ))
    })?;

    Ok(OccurrenceLocation {
        notebook_id: row.get("nid")?,
        notebook_type: row.get("ntype")?,
        notebook_number: row.get("nnum")?,
        page,
    })
}
