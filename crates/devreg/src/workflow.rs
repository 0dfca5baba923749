//! Registration convergence.
//!
//! A device moves `Unregistered -> Registering -> Registered`, and from
//! there through `Reregistering` back to `Registered` when renamed. Each
//! transition is ordered so that the backend record, the local identity and
//! the node-id record agree no matter where a previous run stopped:
//!
//! - the node-id record is the idempotency key: a non-zero ID found there is
//!   re-presented to the backend instead of asking for a new one
//! - local identity is only removed (after a telemetry flush) before the
//!   remote call, never after it
//! - nothing is persisted unless the remote call succeeded, and whatever
//!   ID that call returns is the one persisted

use chrono::Utc;
use devreg_core::{
    CredentialSource, DesiredIdentity, DevRegError, DeviceId, DeviceIdentity, IdentityUpdate,
    Registrar, RegisterOptions, RegistrationOutcome, RegistrationRequest, Result, TelemetryFlush,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::credentials::RandomCredentials;
use crate::flush::SkipFlush;
use crate::identity::LocalIdentityStore;
use crate::node_id::NodeIdStore;

/// Pause between attempts in [`RegistrationWorkflow::register_until_success`]
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(5);

/// Orchestrates registration, retries and rename for a single device
pub struct RegistrationWorkflow {
    registrar: Arc<dyn Registrar>,
    flush: Arc<dyn TelemetryFlush>,
    credentials: Arc<dyn CredentialSource>,
    node_ids: NodeIdStore,
    identities: LocalIdentityStore,
    retry_wait: Duration,
}

impl RegistrationWorkflow {
    /// Workflow with no telemetry flush, entropy-seeded credentials and the
    /// default retry wait
    pub fn new(
        registrar: Arc<dyn Registrar>,
        node_ids: NodeIdStore,
        identities: LocalIdentityStore,
    ) -> Self {
        Self {
            registrar,
            flush: Arc::new(SkipFlush),
            credentials: Arc::new(RandomCredentials::from_entropy()),
            node_ids,
            identities,
            retry_wait: DEFAULT_RETRY_WAIT,
        }
    }

    /// Use `flush` before identity removal and rename
    #[must_use]
    pub fn with_flush(mut self, flush: Arc<dyn TelemetryFlush>) -> Self {
        self.flush = flush;
        self
    }

    /// Draw default names and passwords from `credentials`
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Pause between attempts of [`Self::register_until_success`]
    #[must_use]
    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    /// The node-id store in use
    #[must_use]
    pub const fn node_ids(&self) -> &NodeIdStore {
        &self.node_ids
    }

    /// The identity store in use
    #[must_use]
    pub const fn identities(&self) -> &LocalIdentityStore {
        &self.identities
    }

    /// Whether a valid identity is persisted
    pub async fn is_registered(&self) -> bool {
        self.identities.is_identity_present().await
    }

    /// Make one registration attempt.
    ///
    /// Returns [`RegistrationOutcome::AlreadyRegistered`] without touching
    /// anything when an identity is present, unless
    /// `options.remove_device_config` asks for a fresh identity. The remote
    /// call is made at most once; failures are returned, not retried.
    pub async fn register(
        &self,
        desired: &DesiredIdentity,
        options: &RegisterOptions,
    ) -> Result<RegistrationOutcome> {
        if !options.remove_device_config && self.identities.is_identity_present().await {
            info!("device already registered, nothing to do");
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        let existing_id = if options.ignore_node_id {
            debug!("ignoring node id record");
            DeviceId::UNSET
        } else {
            self.node_ids.existing_device_id().await?
        };

        // Fresh defaults per attempt so a retry never reuses a rejected name.
        let request = RegistrationRequest {
            name: desired
                .name
                .clone()
                .unwrap_or_else(|| self.credentials.device_name()),
            group: desired.group.clone(),
            password: desired
                .password
                .clone()
                .unwrap_or_else(|| self.credentials.password()),
            existing_id,
        };

        if options.remove_device_config {
            self.remove_device_config().await?;
        }

        info!(
            name = %request.name,
            group = %request.group,
            existing_id = %request.existing_id,
            server = %self.registrar.server(),
            "registering device"
        );
        let assigned = self.registrar.register(&request).await?;

        // The assigned ID is authoritative; the node-id record is left as is.
        if request.is_reattempt() && assigned != request.existing_id {
            warn!(
                recorded = %request.existing_id,
                assigned = %assigned,
                "backend assigned a different device id than the node id record holds"
            );
        }

        let node_id_written = !options.ignore_node_id && !request.is_reattempt();
        if node_id_written {
            self.node_ids
                .write(&options.node_id_prefix, assigned)
                .await?;
        }

        self.identities
            .save(&DeviceIdentity {
                id: assigned,
                name: request.name.clone(),
                group: request.group.clone(),
                secret: request.password,
                server: Some(self.registrar.server().to_string()),
                registered_at: Some(Utc::now()),
            })
            .await?;

        info!(
            device_id = %assigned,
            name = %request.name,
            group = %request.group,
            "registered"
        );
        Ok(RegistrationOutcome::Registered {
            device_id: assigned,
            name: request.name,
            group: request.group,
            node_id_written,
        })
    }

    /// Call [`Self::register`] until it succeeds or an identity shows up by
    /// another path.
    ///
    /// Failed attempts are logged and retried after the configured wait,
    /// forever. `shutdown` is only observed between attempts; when it
    /// resolves the loop stops with [`DevRegError::Cancelled`].
    pub async fn register_until_success<S>(
        &self,
        desired: &DesiredIdentity,
        options: &RegisterOptions,
        shutdown: S,
    ) -> Result<RegistrationOutcome>
    where
        S: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.register(desired, options).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => warn!(
                    attempt,
                    error = %e,
                    retry_in_secs = self.retry_wait.as_secs_f64(),
                    "failed to register but will retry until registered"
                ),
            }

            tokio::select! {
                () = tokio::time::sleep(self.retry_wait) => {}
                () = &mut shutdown => {
                    info!(attempt, "shutdown requested, giving up on registration");
                    return Err(DevRegError::Cancelled);
                }
            }

            if self.identities.is_identity_present().await {
                info!("device registered elsewhere while retrying");
                return Ok(RegistrationOutcome::AlreadyRegistered);
            }
        }
    }

    /// Change name, group and/or password while keeping the device ID.
    ///
    /// Omitted fields keep their current values. The node-id record is not
    /// touched. Returns the identity as persisted afterwards.
    pub async fn reregister(&self, update: &IdentityUpdate) -> Result<DeviceIdentity> {
        if update.is_empty() {
            return Err(DevRegError::NothingToChange);
        }

        let current = self
            .identities
            .load()
            .await?
            .filter(DeviceIdentity::is_registered)
            .ok_or(DevRegError::NotRegistered)?;

        self.flush.flush().await?;

        let rename = update.resolve(&current);
        info!(
            device_id = %current.id,
            name = %rename.name,
            group = %rename.group,
            "reregistering device"
        );
        self.registrar.rename(&current, &rename).await?;

        let renamed = DeviceIdentity {
            name: rename.name,
            group: rename.group,
            secret: rename.password,
            ..current
        };
        self.identities.save(&renamed).await?;

        info!(device_id = %renamed.id, "reregistered");
        Ok(renamed)
    }

    /// Flush queued telemetry, then delete the local identity
    pub async fn remove_device_config(&self) -> Result<()> {
        self.flush.flush().await?;
        self.identities.remove().await
    }
}
