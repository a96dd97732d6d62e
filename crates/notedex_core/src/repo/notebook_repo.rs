//! Notebook resolution.
//!
//! Notebooks are created and edited elsewhere; the index only needs to turn
//! a `(type, number)` pair into the internal id it stores on occurrences.

use crate::model::entry::NotebookId;
use crate::repo::ensure_connection_ready;
use crate::repo::entry_repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Resolves `(notebook_type, notebook_number)` to a notebook id.
pub trait NotebookLocator {
    fn resolve_notebook(
        &self,
        notebook_type: &str,
        notebook_number: i64,
    ) -> RepoResult<Option<NotebookId>>;
}

impl<T: NotebookLocator + ?Sized> NotebookLocator for &T {
    fn resolve_notebook(
        &self,
        notebook_type: &str,
        notebook_number: i64,
    ) -> RepoResult<Option<NotebookId>> {
        (**self).resolve_notebook(notebook_type, notebook_number)
    }
}

/// Locator backed by the `notebooks` table.
pub struct SqliteNotebookLocator<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotebookLocator<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["notebooks"])?;
        Ok(Self { conn })
    }
}

impl NotebookLocator for SqliteNotebookLocator<'_> {
    fn resolve_notebook(
        &self,
        notebook_type: &str,
        notebook_number: i64,
    ) -> RepoResult<Option<NotebookId>> {
        let nid = self
            .conn
            .query_row(
                "SELECT nid FROM notebooks WHERE ntype = ?1 AND nnum = ?2;",
                params![notebook_type, notebook_number],
                |row| row.get(0),
            )
            .optional()?;
        Ok(nid)
    }
}
