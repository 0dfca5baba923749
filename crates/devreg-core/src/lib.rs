//! Core types and traits for device registration.
//!
//! This crate provides the foundational pieces shared by the registration
//! client, the workflow and the command-line tool:
//!
//! - **Types**: [`DeviceId`], [`DeviceIdentity`], [`NodeIdRecord`] and the
//!   request/response shapes exchanged with the fleet-management backend
//! - **Errors**: [`ApiError`] for the remote side, [`DevRegError`] for
//!   everything the workflow can surface
//! - **Traits**: the collaborators the workflow is built from
//!   ([`Registrar`], [`TelemetryFlush`], [`ConnectivityGate`],
//!   [`CredentialSource`], [`SystemControl`])
//!
//! # Example
//!
//! ```rust
//! use devreg_core::{DeviceId, NodeIdRecord};
//!
//! let record = NodeIdRecord::for_device("pi", DeviceId::new(42));
//! assert_eq!(record.as_str(), "pi-42");
//! assert_eq!(record.device_id().unwrap(), DeviceId::new(42));
//! ```

#![doc(html_root_url = "https://docs.rs/devreg-core/2.0.0")]

mod error;
mod traits;
pub mod types;

pub use error::{ApiError, ApiResult, DevRegError, Result};
pub use traits::*;
pub use types::*;
