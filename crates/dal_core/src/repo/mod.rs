//! Repository layer: CRUD façades over the `Users` and `Orders` tables.
//!
//! # Responsibility
//! - Define one repository contract per entity.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Writes run `validate()` before any SQL mutation.
//! - Every store failure is surfaced unchanged; nothing is retried.
//! - Read-then-write operations run in one transaction, or join the
//!   caller's transaction when one is already open.

use crate::db::migrations::{current_version, latest_version};
use rusqlite::Connection;

pub mod error;
pub mod order_repo;
pub mod user_repo;

use error::{RepoError, RepoResult};

/// Rejects connections that were not opened through `db::open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Runs `work` atomically.
///
/// Opens a transaction when the connection is in autocommit mode; otherwise
/// the work becomes part of the transaction already in progress.
pub(crate) fn in_write_scope<T>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> RepoResult<T>,
) -> RepoResult<T> {
    if !conn.is_autocommit() {
        return work(conn);
    }

    let tx = conn.unchecked_transaction()?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}
