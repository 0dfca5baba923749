use std::time::Duration;

/// How long and how often to wait for the backend to become reachable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityPolicy {
    /// Time allowed for a single reachability check
    pub timeout: Duration,

    /// Pause between failed checks
    pub retry_interval: Duration,

    /// Number of checks before giving up, `None` for unlimited
    pub max_attempts: Option<u32>,
}

impl ConnectivityPolicy {
    /// Build a policy from a raw attempt count where any negative value
    /// means "retry forever"
    #[must_use]
    pub fn new(timeout: Duration, retry_interval: Duration, attempts: i64) -> Self {
        Self {
            timeout,
            retry_interval,
            max_attempts: u32::try_from(attempts).ok(),
        }
    }
}

impl Default for ConnectivityPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            retry_interval: Duration::from_secs(600),
            max_attempts: None,
        }
    }
}
