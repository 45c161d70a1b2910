use std::time::Duration;

/// Default time-to-live written into a claim.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(5 * 60);
/// Default pause between attempts in blocking mode.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Parameters for [`LockManager::acquire`](crate::manager::LockManager::acquire).
///
/// ```
/// use std::time::Duration;
/// use sqllock_core::types::AcquireOptions;
///
/// let opts = AcquireOptions::default()
///     .owner("worker-7")
///     .expiry(Duration::from_secs(30))
///     .blocking(true)
///     .timeout(Duration::from_secs(5));
/// assert!(opts.block);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireOptions {
    pub owner: String,
    /// Truncated to whole seconds when written; must be at least one second.
    pub expiry: Duration,
    pub block: bool,
    /// Bound on total retry time in blocking mode. `None` retries forever.
    pub timeout: Option<Duration>,
    pub retry_interval: Duration,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            owner: String::new(),
            expiry: DEFAULT_EXPIRY,
            block: false,
            timeout: None,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl AcquireOptions {
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn blocking(mut self, block: bool) -> Self {
        self.block = block;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}
