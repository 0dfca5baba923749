use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned numeric device identifier.
///
/// Zero means "no identity yet" everywhere it appears. Any other value came
/// from a successful backend response and is authoritative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeviceId(u64);

impl DeviceId {
    /// The "no identity" value
    pub const UNSET: Self = Self(0);

    /// Wrap a raw numeric ID
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns true if no ID has been assigned
    #[must_use]
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DeviceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The device's registered identity as persisted locally
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Backend-assigned ID
    pub id: DeviceId,

    /// Display name
    pub name: String,

    /// Group the device belongs to
    pub group: String,

    /// Secret credential used to authenticate as this device
    pub secret: String,

    /// Base URL of the backend the device is registered with
    pub server: Option<String>,

    /// When the identity was first obtained
    pub registered_at: Option<DateTime<Utc>>,
}

impl DeviceIdentity {
    /// Returns true if the identity carries a backend-assigned ID
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        !self.id.is_unset()
    }
}

impl fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("group", &self.group)
            .field("secret", &"<redacted>")
            .field("server", &self.server)
            .field("registered_at", &self.registered_at)
            .finish()
    }
}
