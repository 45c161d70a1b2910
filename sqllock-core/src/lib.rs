//! # sqllock-core
//!
//! Named locks shared by independent processes, arbitrated by a single SQL table.
//! A claim is a primary-key insert, ownership is proven by a random claim token,
//! and claims that stop being renewed expire and are swept by the next contender.
//!
//! ```no_run
//! use std::time::Duration;
//! use sqllock_core::{AcquireOptions, ConnectionDescriptor, LockManager};
//!
//! # fn main() -> sqllock_core::Result<()> {
//! let mut manager = LockManager::new("jobs")?;
//! manager.connect(&ConnectionDescriptor::new("/var/lib/app/locks.db"))?;
//! manager.setup()?;
//!
//! let options = AcquireOptions::default()
//!     .owner("worker-1")
//!     .expiry(Duration::from_secs(30))
//!     .blocking(true)
//!     .timeout(Duration::from_secs(10));
//!
//! if let Some(lock) = manager.acquire("nightly-report", &options)? {
//!     // long work: renew well inside the expiry window
//!     if !lock.ping()? {
//!         return Ok(());
//!     }
//!     lock.release()?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod infrastructure;
#[path = "infrastructure_sqlite.rs"]
mod infrastructure_sqlite;
pub mod manager;
pub mod types;

pub use config::{ConnectionDescriptor, LockManagerConfig};
pub use error::{LockError, Result};
pub use handle::LockHandle;
pub use manager::LockManager;
pub use types::{AcquireOptions, ClaimToken, LockRecord};

#[cfg(test)]
mod test_support;
#[cfg(test)]
#[path = "infrastructure_test.rs"]
mod infrastructure_test;
