//! SQL for one lock table.
//!
//! Timestamps are the store's own clock in Unix milliseconds and `expiry` is whole
//! seconds, so every staleness test scales `expiry` by 1000 before comparing. A row is
//! stale once `last_contact + expiry * 1000 <= now`.

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::types::{ClaimToken, LockRecord};

/// Current store time in Unix milliseconds.
const STORE_NOW_MS: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

/// Statements bound to a single lock table.
#[derive(Debug, Clone)]
pub(crate) struct LockTable {
    name: String,
}

impl LockTable {
    pub(crate) fn new(name: String) -> Self {
        Self { name }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn create(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {t} (
                id           TEXT PRIMARY KEY,
                claim_token  BLOB NOT NULL,
                owner        TEXT NOT NULL,
                last_contact INTEGER NOT NULL DEFAULT ({now}),
                expiry       INTEGER NOT NULL
            );",
            t = self.name,
            now = STORE_NOW_MS,
        ))
    }

    pub(crate) fn drop_table(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", self.name))
    }

    pub(crate) fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![self.name],
            |row| row.get(0),
        )
    }

    /// Deletes every stale row in the table, whatever its name.
    pub(crate) fn sweep(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE last_contact + expiry * 1000 <= {}",
                self.name, STORE_NOW_MS
            ),
            [],
        )
    }

    /// Inserts a claim; `last_contact` takes the column default.
    pub(crate) fn insert(
        &self,
        conn: &Connection,
        id: &str,
        token: &ClaimToken,
        owner: &str,
        expiry_secs: i64,
    ) -> rusqlite::Result<usize> {
        conn.execute(
            &format!(
                "INSERT INTO {} (id, claim_token, owner, expiry) VALUES (?1, ?2, ?3, ?4)",
                self.name
            ),
            params![id, &token.as_bytes()[..], owner, expiry_secs],
        )
    }

    /// True iff the row for `id` carries `token` and is not stale. Read-only.
    pub(crate) fn is_live(
        &self,
        conn: &Connection,
        id: &str,
        token: &ClaimToken,
    ) -> rusqlite::Result<bool> {
        let live: Option<bool> = conn
            .query_row(
                &format!(
                    "SELECT claim_token = ?2 AND last_contact + expiry * 1000 > {}
                     FROM {} WHERE id = ?1",
                    STORE_NOW_MS, self.name
                ),
                params![id, &token.as_bytes()[..]],
                |row| row.get(0),
            )
            .optional()?;
        Ok(live.unwrap_or(false))
    }

    pub(crate) fn touch(
        &self,
        conn: &Connection,
        id: &str,
        token: &ClaimToken,
    ) -> rusqlite::Result<usize> {
        conn.execute(
            &format!(
                "UPDATE {} SET last_contact = {} WHERE id = ?1 AND claim_token = ?2",
                self.name, STORE_NOW_MS
            ),
            params![id, &token.as_bytes()[..]],
        )
    }

    pub(crate) fn delete(
        &self,
        conn: &Connection,
        id: &str,
        token: &ClaimToken,
    ) -> rusqlite::Result<usize> {
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1 AND claim_token = ?2", self.name),
            params![id, &token.as_bytes()[..]],
        )
    }

    /// All rows that are not yet stale, ordered by name.
    pub(crate) fn live_records(&self, conn: &Connection) -> rusqlite::Result<Vec<LockRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, claim_token, owner, last_contact, expiry FROM {}
             WHERE last_contact + expiry * 1000 > {}
             ORDER BY id",
            self.name, STORE_NOW_MS
        ))?;
        let rows = stmt.query_map([], Self::row_to_record)?;
        rows.collect()
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<LockRecord> {
        let token_bytes: Vec<u8> = row.get(1)?;
        let claim_token = ClaimToken::from_slice(&token_bytes).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(
                1,
                "claim_token".to_string(),
                rusqlite::types::Type::Blob,
            )
        })?;

        Ok(LockRecord {
            id: row.get(0)?,
            claim_token,
            owner: row.get(2)?,
            last_contact_ms: row.get(3)?,
            expiry_secs: row.get(4)?,
        })
    }
}

/// True when `err` is a primary-key conflict, i.e. the name is already claimed.
pub(crate) fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}
