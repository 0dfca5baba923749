use std::fmt;

use super::DeviceId;
use crate::error::{DevRegError, Result};

/// Separator between the prefix and the numeric ID
pub const NODE_ID_SEPARATOR: char = '-';

/// Text of the OS node-identifier file: `<prefix>-<numericID>`.
///
/// The record is shared with a configuration-management agent, so it may
/// hold values this tool never wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdRecord {
    raw: String,
}

impl NodeIdRecord {
    /// Wrap raw record text as read from disk
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Build the record for a device under the given prefix
    #[must_use]
    pub fn for_device(prefix: &str, id: DeviceId) -> Self {
        Self {
            raw: format!("{prefix}{NODE_ID_SEPARATOR}{id}"),
        }
    }

    /// Raw record text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the record holds nothing but whitespace
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Parse the numeric ID after the last separator.
    ///
    /// An empty record yields [`DeviceId::UNSET`]. A non-numeric tail is an
    /// [`DevRegError::UnparseableRecord`]; callers decide whether that is fatal.
    pub fn device_id(&self) -> Result<DeviceId> {
        let text = self.raw.trim();
        if text.is_empty() {
            return Ok(DeviceId::UNSET);
        }

        let tail = text.rsplit(NODE_ID_SEPARATOR).next().unwrap_or(text);
        tail.parse::<u64>()
            .map(DeviceId::new)
            .map_err(|_| DevRegError::UnparseableRecord {
                record: text.to_string(),
            })
    }
}

impl fmt::Display for NodeIdRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
