//! # devreg-cli
//!
//! The `device-register` command.
//!
//! ## Features
//!
//! - **Registration**: first-time provisioning with a generated name and
//!   password, idempotent on re-runs
//! - **Retry mode**: `--retry-until-registered` keeps trying until the
//!   backend accepts the device or the process is asked to stop
//! - **Rename**: `--reregister` changes name, group or password while keeping
//!   the device ID
//! - **Node id**: writes `<prefix>-<id>` for the configuration-management agent

pub mod cli;
pub mod config;
pub mod system;

pub use cli::run;
