//! Pooled connection plumbing shared by the manager and its handles.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::time::Duration;
use tracing::info;

use crate::config::ConnectionDescriptor;
use crate::error::{LockError, Result};

pub(crate) type SqlitePool = Pool<SqliteConnectionManager>;

/// A connection checked out of the pool. It goes back to the pool when dropped,
/// so each operation holds one only for its own statements.
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Builds the pool and proves the database answers.
pub(crate) fn open_pool(descriptor: &ConnectionDescriptor) -> Result<SqlitePool> {
    let busy_timeout = Duration::from_millis(descriptor.busy_timeout_ms);
    let manager = SqliteConnectionManager::file(&descriptor.database).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        // WAL keeps readers from blocking the claiming writer
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
    });

    let pool = Pool::builder()
        .max_size(descriptor.max_connections.max(1))
        .connection_timeout(Duration::from_millis(descriptor.connection_timeout_ms))
        .build(manager)?;

    pool.get()?.query_row("SELECT 1", [], |_| Ok(()))?;

    info!(
        database = %descriptor.database.display(),
        max_connections = descriptor.max_connections,
        "connected to lock store"
    );
    Ok(pool)
}

/// Checks a connection out of an optional pool, failing with `NotConnected` when absent.
pub(crate) fn checkout(pool: Option<&SqlitePool>) -> Result<PooledConn> {
    let pool = pool.ok_or(LockError::NotConnected)?;
    Ok(pool.get()?)
}

/// Derives the lock table name from a prefix: trailing underscores are dropped and
/// `_locks` appended, so `"jobs"` and `"jobs_"` both map to `jobs_locks`.
pub fn table_name_for_prefix(prefix: &str) -> Result<String> {
    let trimmed = prefix.trim_end_matches('_');
    let well_formed = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !well_formed {
        return Err(LockError::InvalidTablePrefix(prefix.to_string()));
    }
    Ok(format!("{trimmed}_locks"))
}
