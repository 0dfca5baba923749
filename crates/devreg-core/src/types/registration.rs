use std::fmt;

use super::{DeviceId, DeviceIdentity};

/// Input to a single remote registration call
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Requested display name
    pub name: String,

    /// Requested group
    pub group: String,

    /// Requested secret credential
    pub password: String,

    /// ID from the node-id record, [`DeviceId::UNSET`] if none
    pub existing_id: DeviceId,
}

impl RegistrationRequest {
    /// Returns true if this attempt re-presents a previously assigned ID
    #[must_use]
    pub const fn is_reattempt(&self) -> bool {
        !self.existing_id.is_unset()
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("password", &"<redacted>")
            .field("existing_id", &self.existing_id)
            .finish()
    }
}

/// New name, group and secret for an already registered device.
///
/// All fields are resolved: "keep current" has already been applied.
#[derive(Clone, PartialEq, Eq)]
pub struct RenameRequest {
    /// New display name
    pub name: String,

    /// New group
    pub group: String,

    /// New secret credential
    pub password: String,
}

impl fmt::Debug for RenameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameRequest")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What the caller asked a registration to use.
///
/// Unset name or password is filled in fresh on every attempt.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DesiredIdentity {
    /// Requested display name
    pub name: Option<String>,

    /// Group to register into
    pub group: String,

    /// Requested secret credential
    pub password: Option<String>,
}

impl fmt::Debug for DesiredIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesiredIdentity")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fields to change on rename; `None` keeps the current value
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IdentityUpdate {
    /// New display name
    pub name: Option<String>,

    /// New group
    pub group: Option<String>,

    /// New secret credential
    pub password: Option<String>,
}

impl IdentityUpdate {
    /// Returns true if no field would change
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.group.is_none() && self.password.is_none()
    }

    /// Resolve against the current identity, keeping omitted fields
    #[must_use]
    pub fn resolve(&self, current: &DeviceIdentity) -> RenameRequest {
        RenameRequest {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            group: self.group.clone().unwrap_or_else(|| current.group.clone()),
            password: self
                .password
                .clone()
                .unwrap_or_else(|| current.secret.clone()),
        }
    }
}

impl fmt::Debug for IdentityUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityUpdate")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Options for a single `register` attempt
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Neither read nor write the node-id record
    pub ignore_node_id: bool,

    /// Flush telemetry and delete the local identity before registering
    pub remove_device_config: bool,

    /// Prefix for a freshly written node-id record (e.g. `pi` or `pi-test`)
    pub node_id_prefix: String,
}

/// Result of a successful `register` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A valid identity was already present; nothing was done
    AlreadyRegistered,

    /// The backend accepted the registration
    Registered {
        /// Authoritative ID returned by the backend
        device_id: DeviceId,
        /// Name the device was registered under
        name: String,
        /// Group the device was registered into
        group: String,
        /// Whether a new node-id record was written
        node_id_written: bool,
    },
}

impl RegistrationOutcome {
    /// The assigned ID, if this attempt registered the device
    #[must_use]
    pub const fn device_id(&self) -> Option<DeviceId> {
        match self {
            Self::AlreadyRegistered => None,
            Self::Registered { device_id, .. } => Some(*device_id),
        }
    }
}
