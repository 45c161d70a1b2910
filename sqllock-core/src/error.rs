use thiserror::Error;

use crate::types::{MAX_EXPIRY_SECS, MAX_OWNER_LEN};

/// Errors raised by the lock manager and its handles.
///
/// Losing a race for a name is not an error: acquisition reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum LockError {
    /// An operation was attempted before `connect`.
    #[error("lock manager is not connected")]
    NotConnected,

    #[error("invalid table prefix {0:?}: expected ASCII letters, digits or '_'")]
    InvalidTablePrefix(String),

    #[error("lock expiry must be between one second and {} seconds", MAX_EXPIRY_SECS)]
    InvalidExpiry,

    #[error("owner is {len} bytes, limit is {}", MAX_OWNER_LEN)]
    OwnerTooLong { len: usize },

    /// The pool could not be built or could not hand out a connection.
    #[error("connection error: {0}")]
    Connection(#[from] r2d2::Error),

    /// Any store-level failure other than a primary-key conflict.
    #[error("backend failure: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LockError>;
