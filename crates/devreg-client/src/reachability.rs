//! Waiting for the backend to become reachable.

use async_trait::async_trait;
use devreg_core::{ApiResult, ConnectivityGate, ConnectivityPolicy, DevRegError, Result};
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::client::normalize_base_url;

/// Pause between probes inside one attempt
const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Per-request timeout for a single probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// [`ConnectivityGate`] that treats any HTTP answer from the backend as
/// "reachable".
///
/// Each attempt keeps probing for up to `policy.timeout`. A failed attempt
/// is followed by `policy.retry_interval` of quiet before the next one.
pub struct HttpReachability {
    http: HttpClient,
    url: String,
    probe_interval: Duration,
}

impl HttpReachability {
    /// Probe `url`, which must be an absolute http(s) URL
    pub fn new(url: &str) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| devreg_core::ApiError::Http(e.to_string()))?;

        Ok(Self {
            http,
            url: normalize_base_url(url)?,
            probe_interval: DEFAULT_PROBE_INTERVAL,
        })
    }

    /// Set the pause between probes inside one attempt
    #[must_use]
    pub const fn probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    async fn probe(&self) -> bool {
        match self.http.get(&self.url).send().await {
            Ok(response) => {
                debug!(status = %response.status(), url = %self.url, "backend answered");
                true
            }
            Err(e) => {
                debug!(error = %e, url = %self.url, "backend probe failed");
                false
            }
        }
    }

    async fn probe_until_up(&self) {
        while !self.probe().await {
            tokio::time::sleep(self.probe_interval).await;
        }
    }
}

#[async_trait]
impl ConnectivityGate for HttpReachability {
    async fn wait_until_reachable(&self, policy: &ConnectivityPolicy) -> Result<()> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            if tokio::time::timeout(policy.timeout, self.probe_until_up())
                .await
                .is_ok()
            {
                info!(attempt, url = %self.url, "network connection available");
                return Ok(());
            }

            if policy.max_attempts.is_some_and(|max| attempt >= max) {
                return Err(DevRegError::Connectivity(format!(
                    "{} unreachable after {attempt} attempt(s)",
                    self.url
                )));
            }

            warn!(
                attempt,
                retry_in_secs = policy.retry_interval.as_secs(),
                "no network connection, will retry"
            );
            tokio::time::sleep(policy.retry_interval).await;
        }
    }
}
