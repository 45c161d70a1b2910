use serde::Serialize;

use super::ClaimToken;

/// Maximum owner metadata length in bytes.
pub const MAX_OWNER_LEN: usize = 1024;

/// Longest accepted expiry in seconds; keeps `expiry * 1000` within `i64`.
pub const MAX_EXPIRY_SECS: i64 = i64::MAX / 1000;

/// A persisted claim on a lock name, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockRecord {
    /// The lock name (primary key)
    pub id: String,
    /// Token of the acquisition that currently owns the name
    pub claim_token: ClaimToken,
    /// Free-form holder metadata, not used for arbitration
    pub owner: String,
    /// Store time of the claim or last renewal, Unix milliseconds
    pub last_contact_ms: i64,
    /// Time-to-live in seconds
    pub expiry_secs: i64,
}

impl LockRecord {
    /// Store time at which the record becomes stale unless renewed.
    pub fn expires_at_ms(&self) -> i64 {
        self.last_contact_ms
            .saturating_add(self.expiry_secs.saturating_mul(1000))
    }
}
