//! HTTP client for the fleet-management registration API.
//!
//! This crate provides [`ApiClient`], the network-backed [`Registrar`], and
//! [`HttpReachability`], a [`ConnectivityGate`] that polls the same backend.
//!
//! [`Registrar`]: devreg_core::Registrar
//! [`ConnectivityGate`]: devreg_core::ConnectivityGate

#![doc(html_root_url = "https://docs.rs/devreg-client/2.0.0")]

mod client;
mod reachability;
pub mod api;

pub use client::{ApiClient, ApiClientBuilder, DEFAULT_BASE_URL};
pub use devreg_core::{ApiError, ApiResult};
pub use reachability::HttpReachability;
