//! Configuration management.

use anyhow::{Context as _, Result};
use devreg::ConnectivityPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tool configuration, read from TOML.
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Production backend.
    pub api_url: String,

    /// Backend used with `--test-api`.
    pub test_api_url: String,

    /// Group new devices join when none is given.
    pub default_group: String,

    /// Node-id file shared with the configuration-management agent.
    pub node_id_path: PathBuf,

    /// Prefix in front of the device ID in the node-id file.
    pub node_id_prefix: String,

    /// Local identity file.
    pub identity_path: PathBuf,

    /// Seconds between attempts with `--retry-until-registered`.
    pub retry_wait_secs: u64,

    /// Timeout for a single backend request.
    pub request_timeout_secs: u64,

    /// How long one connectivity attempt may take.
    pub connection_timeout_secs: u64,

    /// Pause between connectivity attempts.
    pub connection_retry_interval_secs: u64,

    /// Connectivity attempts before giving up, negative for unlimited.
    pub connection_max_attempts: i64,

    /// Command that flushes queued telemetry; unset skips the flush.
    pub flush_command: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: String::from("https://api.cacophony.org.nz"),
            test_api_url: String::from("https://api-test.cacophony.org.nz"),
            default_group: String::from("new"),
            node_id_path: PathBuf::from(devreg::node_id::DEFAULT_NODE_ID_PATH),
            node_id_prefix: String::from(devreg::node_id::DEFAULT_NODE_ID_PREFIX),
            identity_path: PathBuf::from(devreg::identity::DEFAULT_IDENTITY_PATH),
            retry_wait_secs: 5,
            request_timeout_secs: 30,
            connection_timeout_secs: 120,
            connection_retry_interval_secs: 600,
            connection_max_attempts: -1,
            flush_command: None,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("nz.org", "cacophony", "device-register")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default path may be absent, in
    /// which case defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// How to wait for the backend before registering.
    #[must_use]
    pub fn connectivity_policy(&self) -> ConnectivityPolicy {
        ConnectivityPolicy::new(
            Duration::from_secs(self.connection_timeout_secs),
            Duration::from_secs(self.connection_retry_interval_secs),
            self.connection_max_attempts,
        )
    }

    /// Pause between registration attempts.
    #[must_use]
    pub const fn retry_wait(&self) -> Duration {
        Duration::from_secs(self.retry_wait_secs)
    }

    /// Timeout for a single backend request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
