//! The locally persisted device identity.
//!
//! Stored as TOML with a `[device]` table and a `[secrets]` table:
//!
//! ```toml
//! [device]
//! id = 42
//! name = "fox-lamp-otter"
//! group = "g1"
//! server = "https://api.cacophony.org.nz"
//!
//! [secrets]
//! password = "..."
//! ```

use chrono::{DateTime, Utc};
use devreg_core::{DevRegError, DeviceId, DeviceIdentity, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::atomic::{remove_if_exists, write_atomic};

/// Default location of the identity file
pub const DEFAULT_IDENTITY_PATH: &str = "/etc/cacophony/device.toml";

/// Identity file holds a secret; keep it owner-only
const IDENTITY_FILE_MODE: u32 = 0o600;

#[derive(Debug, Serialize, Deserialize)]
struct IdentityFile {
    device: DeviceSection,
    secrets: SecretsSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeviceSection {
    #[serde(default)]
    id: DeviceId,
    name: String,
    group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registered_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct SecretsSection {
    password: String,
}

impl std::fmt::Debug for SecretsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretsSection { .. }")
    }
}

impl From<IdentityFile> for DeviceIdentity {
    fn from(file: IdentityFile) -> Self {
        Self {
            id: file.device.id,
            name: file.device.name,
            group: file.device.group,
            secret: file.secrets.password,
            server: file.device.server,
            registered_at: file.device.registered_at,
        }
    }
}

impl From<&DeviceIdentity> for IdentityFile {
    fn from(identity: &DeviceIdentity) -> Self {
        Self {
            device: DeviceSection {
                id: identity.id,
                name: identity.name.clone(),
                group: identity.group.clone(),
                server: identity.server.clone(),
                registered_at: identity.registered_at,
            },
            secrets: SecretsSection {
                password: identity.secret.clone(),
            },
        }
    }
}

/// Reads, writes and removes the persisted [`DeviceIdentity`]
#[derive(Debug, Clone)]
pub struct LocalIdentityStore {
    path: PathBuf,
}

impl LocalIdentityStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this store reads and writes
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the identity; a missing file is `None`
    pub async fn load(&self) -> Result<Option<DeviceIdentity>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DevRegError::io(&self.path, e)),
        };

        let file: IdentityFile = toml::from_str(&content).map_err(|e| {
            DevRegError::Identity(format!("{}: {e}", self.path.display()))
        })?;
        Ok(Some(file.into()))
    }

    /// True iff a readable identity with a non-zero ID is persisted.
    ///
    /// Read and parse failures count as "not present" so that a broken
    /// record leads to registration rather than silent reuse.
    pub async fn is_identity_present(&self) -> bool {
        match self.load().await {
            Ok(Some(identity)) => identity.is_registered(),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "treating unreadable identity as absent");
                false
            }
        }
    }

    /// Atomically persist `identity`
    pub async fn save(&self, identity: &DeviceIdentity) -> Result<()> {
        let content = toml::to_string_pretty(&IdentityFile::from(identity))
            .map_err(|e| DevRegError::Identity(e.to_string()))?;
        write_atomic(&self.path, content.as_bytes(), Some(IDENTITY_FILE_MODE)).await?;
        debug!(path = %self.path.display(), device_id = %identity.id, "saved device identity");
        Ok(())
    }

    /// Delete the identity and the secret stored with it.
    ///
    /// Callers must flush telemetry queued under the identity first.
    pub async fn remove(&self) -> Result<()> {
        if remove_if_exists(&self.path).await? {
            info!(path = %self.path.display(), "removed device identity");
        } else {
            debug!(path = %self.path.display(), "no device identity to remove");
        }
        Ok(())
    }
}
