//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::Cli;
use clap::Parser;
use devreg::{ConnectivityGate, HttpReachability, SystemControl};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Run the CLI application.
pub async fn run(system: &dyn SystemControl) -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(&cli, system).await
}

/// Carry out one invocation with already parsed arguments.
///
/// Only a device found registered before any work starts skips `--reboot`;
/// once a command has run, the reboot follows however it ended.
pub async fn execute(cli: &Cli, system: &dyn SystemControl) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "running device-register");

    let config = Config::load(cli.config.as_deref())?;
    let ctx = commands::Context::new(cli, config);
    info!(api = %ctx.api_url, "using API");

    // Validates the URL before anything touches the network or disk.
    let client = ctx.client()?;
    let workflow = ctx.workflow(client);

    if !cli.reregister && !cli.remove_device_config && workflow.is_registered().await {
        info!("device already registered, exiting");
        return Ok(());
    }

    info!("requesting internet connection");
    HttpReachability::new(&ctx.api_url)?
        .wait_until_reachable(&ctx.config.connectivity_policy())
        .await?;
    info!("internet connection made");

    if cli.reregister {
        commands::reregister::execute(&ctx, cli, &workflow).await?;
    } else {
        commands::register::execute(&ctx, cli, &workflow).await?;
    }

    if cli.reboot {
        system.reboot()?;
    }
    Ok(())
}

/// Install the log subscriber; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    // Timestamps come from the journal; stdout is reserved for results.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .try_init();
}
