//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define data access contracts for entries, occurrences and notebook
//!   resolution.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Repositories only accept connections that went through `db::open_db*`.
//! - No repository commits; the caller owns transaction boundaries.

use crate::db::migrations::{current_version, latest_version};
use rusqlite::Connection;

pub mod entry_repo;
pub mod notebook_repo;
pub mod occurrence_repo;

use entry_repo::{RepoError, RepoResult};

/// Verifies schema version and required tables before a repository is used.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
