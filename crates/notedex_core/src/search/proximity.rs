//! Proximity search: which entries occur on or near a page.
//!
//! # Invariants
//! - Only occurrences in the resolved notebook are returned.
//! - Bounds are inclusive and compared as normalized strings, so a range
//!   such as `012-14` is found when its start is within the window.
//! - The upper bound is clamped to the largest page the notebook type's
//!   width can hold; a window entirely above it matches nothing.
//! - Redirect markers are never returned.
//! - Ordering is `(page, lowercase name, name)`.

use crate::config::PageFormatConfig;
use crate::db::DbError;
use crate::model::entry::EntryId;
use crate::model::page::{max_page_number, normalize_page_number, Page, PageFormatError};
use crate::repo::entry_repo::RepoError;
use crate::repo::notebook_repo::NotebookLocator;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Margin applied when the caller does not pick one.
pub const DEFAULT_MARGIN: u64 = 1;

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error.
#[derive(Debug)]
pub enum SearchError {
    /// The `(type, number)` pair has no notebook.
    NotebookNotFound {
        notebook_type: String,
        notebook_number: i64,
    },
    Format(PageFormatError),
    Repo(RepoError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotebookNotFound {
                notebook_type,
                notebook_number,
            } => write!(f, "notebook not found: {notebook_type}{notebook_number}"),
            Self::Format(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotebookNotFound { .. } => None,
            Self::Format(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::Db(DbError::Sqlite(value)))
    }
}

impl From<PageFormatError> for SearchError {
    fn from(value: PageFormatError) -> Self {
        Self::Format(value)
    }
}

/// Location to look around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityQuery {
    pub notebook_type: String,
    pub notebook_number: i64,
    pub page: u64,
    /// Pages on either side of `page` to include.
    pub margin: u64,
}

impl ProximityQuery {
    /// Creates a query with [`DEFAULT_MARGIN`].
    pub fn new(notebook_type: impl Into<String>, notebook_number: i64, page: u64) -> Self {
        Self {
            notebook_type: notebook_type.into(),
            notebook_number,
            page,
            margin: DEFAULT_MARGIN,
        }
    }

    pub fn with_margin(mut self, margin: u64) -> Self {
        self.margin = margin;
        self
    }
}

/// One co-located occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityHit {
    pub page: Page,
    pub eid: EntryId,
    pub entry_name: String,
}

/// Finds entries occurring within `query.margin` pages of `query.page`.
///
/// The lower bound saturates at page 0 and the upper bound at
/// [`max_page_number`] for the notebook type.
///
/// # Errors
/// - [`SearchError::NotebookNotFound`] when the notebook cannot be resolved.
pub fn occurrences_around<N>(
    conn: &Connection,
    notebooks: &N,
    pages: &PageFormatConfig,
    query: &ProximityQuery,
) -> SearchResult<Vec<ProximityHit>>
where
    N: NotebookLocator + ?Sized,
{
    let Some(nid) = notebooks.resolve_notebook(&query.notebook_type, query.notebook_number)?
    else {
        return Err(SearchError::NotebookNotFound {
            notebook_type: query.notebook_type.clone(),
            notebook_number: query.notebook_number,
        });
    };

    let max_page = max_page_number(&query.notebook_type, pages);
    let low_number = query.page.saturating_sub(query.margin);
    if low_number > max_page {
        return Ok(Vec::new());
    }
    let high_number = query.page.saturating_add(query.margin).min(max_page);

    let low = normalize_page_number(low_number, &query.notebook_type, pages)?;
    let high = normalize_page_number(high_number, &query.notebook_type, pages)?;

    let mut stmt = conn.prepare(
        "SELECT
            o.page AS page,
            o.page_kind AS page_kind,
            e.eid AS eid,
            e.name AS name
         FROM occurrences o
         INNER JOIN entries e ON e.eid = o.eid
         WHERE o.nid = ?1
           AND o.page_kind = 'page'
           AND o.page BETWEEN ?2 AND ?3;",
    )?;
    let mut rows = stmt.query(params![nid, low.as_str(), high.as_str()])?;

    let mut hits = Vec::new();
    while let Some(row) = rows.next()? {
        let kind: String = row.get("page_kind")?;
        let text: String = row.get("page")?;
        let page = Page::from_db(&kind, text.clone()).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid page `{text}` in occurrences.page"))
        })?;
        hits.push(ProximityHit {
            page,
            eid: row.get("eid")?,
            entry_name: row.get("name")?,
        });
    }

    sort_hits(&mut hits);
    Ok(hits)
}

fn sort_hits(hits: &mut [ProximityHit]) {
    hits.sort_by_cached_key(|hit| {
        (
            hit.page.as_str().to_string(),
            hit.entry_name.to_lowercase(),
            hit.entry_name.clone(),
        )
    });
}
