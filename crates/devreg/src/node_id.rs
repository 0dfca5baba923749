//! The OS node-identifier file shared with the configuration-management
//! agent.

use devreg_core::{DevRegError, DeviceId, NodeIdRecord, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::atomic::write_atomic;

/// Default location of the node-id file
pub const DEFAULT_NODE_ID_PATH: &str = "/etc/salt/minion_id";

/// Default prefix written in front of the device ID
pub const DEFAULT_NODE_ID_PREFIX: &str = "pi";

/// Reads and writes the node-id record
#[derive(Debug, Clone)]
pub struct NodeIdStore {
    path: PathBuf,
}

impl NodeIdStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this store reads and writes
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record; a missing file is `None`, not an error
    pub async fn read(&self) -> Result<Option<NodeIdRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => {
                let record = NodeIdRecord::parse(String::from_utf8_lossy(&raw));
                debug!(path = %self.path.display(), record = %record, "read node id record");
                Ok(Some(record))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DevRegError::io(&self.path, e)),
        }
    }

    /// Numeric ID carried by `record`, or [`DeviceId::UNSET`] if it has none.
    ///
    /// An unparseable record is logged and treated as empty; the agent owns
    /// the format and legacy values are expected.
    pub fn extract_id(record: &NodeIdRecord) -> DeviceId {
        match record.device_id() {
            Ok(id) => {
                if id.is_unset() {
                    info!("node id record is empty, a new id will be requested");
                }
                id
            }
            Err(e) => {
                warn!(error = %e, "ignoring unparseable node id record");
                DeviceId::UNSET
            }
        }
    }

    /// The device ID already recorded on this host, [`DeviceId::UNSET`] if
    /// the file is absent or holds no usable ID
    pub async fn existing_device_id(&self) -> Result<DeviceId> {
        let id = self
            .read()
            .await?
            .map_or(DeviceId::UNSET, |record| Self::extract_id(&record));

        if !id.is_unset() {
            info!(device_id = %id, "node id record already holds a device id");
        }
        Ok(id)
    }

    /// Atomically replace the record with `<prefix>-<id>`
    pub async fn write(&self, prefix: &str, id: DeviceId) -> Result<NodeIdRecord> {
        let record = NodeIdRecord::for_device(prefix, id);
        info!(path = %self.path.display(), record = %record, "setting node id");
        write_atomic(&self.path, record.as_str().as_bytes(), None).await?;
        Ok(record)
    }
}
