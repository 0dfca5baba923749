//! Command implementations.

pub mod register;
pub mod reregister;

use anyhow::Result;
use devreg::{ApiClient, CommandFlush, LocalIdentityStore, NodeIdStore, RegistrationWorkflow};
use std::sync::Arc;

use crate::cli::args::Cli;
use crate::config::Config;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Backend this run talks to
    pub api_url: String,

    /// Loaded configuration
    pub config: Config,
}

impl Context {
    /// Resolve the backend URL: `--test-api` wins over `--api`, which wins
    /// over the config file.
    pub fn new(cli: &Cli, config: Config) -> Self {
        let api_url = if cli.test_api {
            config.test_api_url.clone()
        } else {
            cli.api.clone().unwrap_or_else(|| config.api_url.clone())
        };
        Self { api_url, config }
    }

    /// Create a registration client for the resolved backend.
    pub fn client(&self) -> Result<ApiClient> {
        Ok(ApiClient::builder(&self.api_url)
            .timeout(self.config.request_timeout())
            .build()?)
    }

    /// Assemble the workflow over the configured files.
    pub fn workflow(&self, client: ApiClient) -> RegistrationWorkflow {
        let workflow = RegistrationWorkflow::new(
            Arc::new(client),
            NodeIdStore::new(&self.config.node_id_path),
            LocalIdentityStore::new(&self.config.identity_path),
        )
        .with_retry_wait(self.config.retry_wait());

        match self
            .config
            .flush_command
            .as_deref()
            .and_then(CommandFlush::from_argv)
        {
            Some(flush) => workflow.with_flush(Arc::new(flush)),
            None => workflow,
        }
    }
}
