//! Capability returned by a successful claim.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::error::Result;
use crate::manager::LockManager;
use crate::types::ClaimToken;

/// Proof of a claim on one lock name.
///
/// The stored row is the source of truth: the handle only remembers which token it
/// was issued. Once the row is released, swept, or re-claimed under another token,
/// every check on this handle reports `false` and nothing brings it back.
///
/// Dropping a handle that was never released releases it, so a guard scope frees the
/// name on every exit path.
#[derive(Debug)]
pub struct LockHandle<'m> {
    manager: &'m LockManager,
    id: String,
    token: ClaimToken,
    owner: String,
    released: AtomicBool,
}

impl<'m> LockHandle<'m> {
    pub(crate) fn new(
        manager: &'m LockManager,
        id: String,
        token: ClaimToken,
        owner: String,
    ) -> Self {
        Self {
            manager,
            id,
            token,
            owner,
            released: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn token(&self) -> &ClaimToken {
        &self.token
    }

    /// Whether this handle still owns a live claim. Never writes.
    pub fn valid(&self) -> Result<bool> {
        let conn = self.manager.conn()?;
        Ok(self.manager.table().is_live(&conn, &self.id, &self.token)?)
    }

    /// Renews the claim by resetting its contact time to now.
    ///
    /// `false` means the row under this token is gone and the lock must be treated
    /// as lost. Call well inside the expiry window to hold a lock indefinitely.
    pub fn ping(&self) -> Result<bool> {
        let conn = self.manager.conn()?;
        let renewed = self.manager.table().touch(&conn, &self.id, &self.token)? == 1;
        debug!(lock_id = %self.id, renewed, "lock ping");
        Ok(renewed)
    }

    /// Releases the claim if this handle still owns it.
    ///
    /// Returns `true` only for the call that actually removed the row; releasing a
    /// lost or already released lock returns `false`.
    pub fn release(&self) -> Result<bool> {
        if !self.valid()? {
            self.released.store(true, Ordering::Release);
            return Ok(false);
        }
        let conn = self.manager.conn()?;
        let removed = self.manager.table().delete(&conn, &self.id, &self.token)? == 1;
        self.released.store(true, Ordering::Release);
        debug!(lock_id = %self.id, removed, "lock released");
        Ok(removed)
    }
}

impl Drop for LockHandle<'_> {
    fn drop(&mut self) {
        if self.released.load(Ordering::Acquire) {
            return;
        }
        if let Err(e) = self.release() {
            warn!(lock_id = %self.id, error = %e, "failed to release lock on drop");
        }
    }
}
