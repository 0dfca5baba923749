//! Provision a field device with a unique identity against the
//! fleet-management backend.
//!
//! Three pieces of state must agree after any sequence of crashes and
//! retries: the backend's record, the local identity file, and the OS
//! node-id file read by the configuration-management agent. The
//! [`RegistrationWorkflow`] owns the ordering that keeps them in step.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use devreg::{
//!     ApiClient, DesiredIdentity, LocalIdentityStore, NodeIdStore, RegisterOptions,
//!     RegistrationWorkflow,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> devreg::Result<()> {
//!     let client = ApiClient::new("https://api.cacophony.org.nz")?;
//!     let workflow = RegistrationWorkflow::new(
//!         Arc::new(client),
//!         NodeIdStore::new("/etc/salt/minion_id"),
//!         LocalIdentityStore::new("/etc/cacophony/device.toml"),
//!     );
//!
//!     let desired = DesiredIdentity {
//!         group: "new".into(),
//!         ..Default::default()
//!     };
//!     let options = RegisterOptions {
//!         node_id_prefix: "pi".into(),
//!         ..Default::default()
//!     };
//!     let outcome = workflow.register(&desired, &options).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/devreg/2.0.0")]

mod atomic;
pub mod credentials;
pub mod flush;
pub mod identity;
pub mod node_id;
pub mod workflow;

// Re-export core types
pub use devreg_core::*;

// Re-export client
pub use devreg_client::{ApiClient, ApiClientBuilder, HttpReachability};

pub use credentials::RandomCredentials;
pub use flush::{CommandFlush, SkipFlush};
pub use identity::LocalIdentityStore;
pub use node_id::NodeIdStore;
pub use workflow::RegistrationWorkflow;
