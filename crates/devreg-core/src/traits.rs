//! Collaborators the registration workflow is assembled from.
//!
//! Every side effect outside the two local files goes through one of these,
//! so tests can swap in deterministic fakes.

use async_trait::async_trait;

use crate::error::{ApiResult, Result};
use crate::types::{
    ConnectivityPolicy, DeviceId, DeviceIdentity, RegistrationRequest, RenameRequest,
};

/// Remote registration and rename calls against the fleet-management backend
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Register the device, returning the authoritative ID.
    ///
    /// When `request.existing_id` is set the backend must treat the call as a
    /// re-attempt and hand back the same ID rather than minting a new one.
    async fn register(&self, request: &RegistrationRequest) -> ApiResult<DeviceId>;

    /// Change name, group and secret of an already registered device,
    /// authenticating as `current`
    async fn rename(&self, current: &DeviceIdentity, update: &RenameRequest) -> ApiResult<()>;

    /// Base URL of the backend, recorded alongside the identity
    fn server(&self) -> &str;
}

/// Flushes telemetry queued under the current identity
#[async_trait]
pub trait TelemetryFlush: Send + Sync {
    /// Upload or otherwise settle everything queued so far
    async fn flush(&self) -> Result<()>;
}

/// Blocks until the backend network is reachable
#[async_trait]
pub trait ConnectivityGate: Send + Sync {
    /// Wait according to `policy`, failing once its attempts are exhausted
    async fn wait_until_reachable(&self, policy: &ConnectivityPolicy) -> Result<()>;
}

/// Source of default device names and passwords
pub trait CredentialSource: Send + Sync {
    /// A fresh human-readable device name
    fn device_name(&self) -> String;

    /// A fresh high-entropy password
    fn password(&self) -> String;
}

/// Host-level side effects kept out of the workflow's return values
pub trait SystemControl: Send + Sync {
    /// Reboot the device
    fn reboot(&self) -> Result<()>;

    /// Terminate the process with `code`
    fn exit_process(&self, code: i32) -> !;
}
