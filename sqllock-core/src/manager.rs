//! The lock namespace: claims names, sweeps stale claims, and layers blocking
//! acquisition over a single non-blocking attempt.

use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::{ConnectionDescriptor, LockManagerConfig, DEFAULT_TABLE_PREFIX};
use crate::error::{LockError, Result};
use crate::handle::LockHandle;
use crate::infrastructure::{checkout, open_pool, table_name_for_prefix, PooledConn, SqlitePool};
use crate::infrastructure_sqlite::{is_duplicate_key, LockTable};
use crate::types::{AcquireOptions, ClaimToken, LockRecord, MAX_EXPIRY_SECS, MAX_OWNER_LEN};

/// Owns one lock table and the pool used to reach it.
///
/// Mutual exclusion comes entirely from the table's primary key: a claim is an
/// insert, and a second insert of the same name fails until the first row is
/// released or swept. Nothing here locks in-process.
#[derive(Debug)]
pub struct LockManager {
    table: LockTable,
    pool: Option<SqlitePool>,
}

impl LockManager {
    /// Creates an unconnected manager for the table derived from `table_prefix`.
    pub fn new(table_prefix: &str) -> Result<Self> {
        Ok(Self {
            table: LockTable::new(table_name_for_prefix(table_prefix)?),
            pool: None,
        })
    }

    /// Creates a manager and connects it in one step.
    pub fn from_config(config: &LockManagerConfig) -> Result<Self> {
        let mut manager = Self::new(&config.table_prefix)?;
        manager.connect(&config.connection)?;
        Ok(manager)
    }

    /// Opens the connection pool. Replaces any previous pool.
    pub fn connect(&mut self, descriptor: &ConnectionDescriptor) -> Result<&mut Self> {
        self.pool = Some(open_pool(descriptor)?);
        Ok(self)
    }

    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    /// Creates the lock table if it does not exist yet.
    pub fn setup(&self) -> Result<&Self> {
        let conn = self.conn()?;
        self.table.create(&conn)?;
        info!(table = self.table.name(), "lock table ready");
        Ok(self)
    }

    /// Drops the lock table if present. Outstanding handles lose their locks.
    pub fn destroy(&self) -> Result<&Self> {
        let conn = self.conn()?;
        self.table.drop_table(&conn)?;
        info!(table = self.table.name(), "lock table dropped");
        Ok(self)
    }

    /// Whether the lock table currently exists.
    pub fn ready(&self) -> Result<bool> {
        let conn = self.conn()?;
        Ok(self.table.exists(&conn)?)
    }

    /// Claims `id`.
    ///
    /// Returns `Ok(None)` when the name stays held by someone else: immediately in
    /// non-blocking mode, or once `timeout` has elapsed in blocking mode. Only
    /// conflicts are retried; any other store failure is returned as is.
    pub fn acquire(&self, id: &str, options: &AcquireOptions) -> Result<Option<LockHandle<'_>>> {
        let expiry_secs = validate_claim(&options.owner, options.expiry)?;
        let handle = poll(options.block, options.timeout, options.retry_interval, || {
            self.acquire_once(id, &options.owner, expiry_secs)
        })?;
        if handle.is_none() && options.block {
            debug!(lock_id = id, "gave up waiting for lock");
        }
        Ok(handle)
    }

    /// A single non-blocking claim attempt.
    pub fn try_acquire(
        &self,
        id: &str,
        owner: &str,
        expiry: Duration,
    ) -> Result<Option<LockHandle<'_>>> {
        let expiry_secs = validate_claim(owner, expiry)?;
        self.acquire_once(id, owner, expiry_secs)
    }

    /// Deletes every stale claim in the table. Returns how many were removed.
    pub fn sweep_expired(&self) -> Result<usize> {
        let conn = self.conn()?;
        let swept = self.table.sweep(&conn)?;
        if swept > 0 {
            debug!(table = self.table.name(), swept, "swept stale locks");
        }
        Ok(swept)
    }

    /// Lists claims that are not stale, without sweeping anything.
    pub fn active_locks(&self) -> Result<Vec<LockRecord>> {
        let conn = self.conn()?;
        Ok(self.table.live_records(&conn)?)
    }

    fn acquire_once(
        &self,
        id: &str,
        owner: &str,
        expiry_secs: i64,
    ) -> Result<Option<LockHandle<'_>>> {
        let conn = self.conn()?;

        let swept = self.table.sweep(&conn)?;
        if swept > 0 {
            debug!(table = self.table.name(), swept, "swept stale locks");
        }

        let token = ClaimToken::generate();
        match self.table.insert(&conn, id, &token, owner, expiry_secs) {
            Ok(_) => {
                debug!(lock_id = id, owner, expiry_secs, "lock claimed");
                Ok(Some(LockHandle::new(self, id.to_string(), token, owner.to_string())))
            }
            Err(e) if is_duplicate_key(&e) => {
                debug!(lock_id = id, "lock already held");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn conn(&self) -> Result<PooledConn> {
        checkout(self.pool.as_ref())
    }

    pub(crate) fn table(&self) -> &LockTable {
        &self.table
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self {
            table: LockTable::new(format!("{DEFAULT_TABLE_PREFIX}_locks")),
            pool: None,
        }
    }
}

/// Calls `attempt` until it yields a value.
///
/// Without `block` there is exactly one attempt. With it, a failed attempt is followed
/// by a sleep of `retry_interval`, unless more than `timeout` has passed since the first
/// attempt. Errors end the loop immediately.
pub(crate) fn poll<T, F>(
    block: bool,
    timeout: Option<Duration>,
    retry_interval: Duration,
    mut attempt: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Result<Option<T>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = attempt()? {
            return Ok(Some(value));
        }
        if !block {
            return Ok(None);
        }
        if let Some(timeout) = timeout {
            if started.elapsed() > timeout {
                return Ok(None);
            }
        }
        thread::sleep(retry_interval);
    }
}

fn validate_claim(owner: &str, expiry: Duration) -> Result<i64> {
    if owner.len() > MAX_OWNER_LEN {
        return Err(LockError::OwnerTooLong { len: owner.len() });
    }
    match i64::try_from(expiry.as_secs()) {
        Ok(secs) if secs > 0 && secs <= MAX_EXPIRY_SECS => Ok(secs),
        _ => Err(LockError::InvalidExpiry),
    }
}
