//! `device-register` - first-time or repeated registration.

use anyhow::Result;
use colored::Colorize;
use devreg::{DesiredIdentity, RegisterOptions, RegistrationOutcome, RegistrationWorkflow};
use tracing::info;

use super::Context;
use crate::cli::args::Cli;

pub async fn execute(
    ctx: &Context,
    cli: &Cli,
    workflow: &RegistrationWorkflow,
) -> Result<RegistrationOutcome> {
    let desired = desired_identity(ctx, cli);
    let options = register_options(ctx, cli);

    let outcome = if cli.retry_until_registered {
        workflow
            .register_until_success(&desired, &options, shutdown_signal())
            .await?
    } else {
        workflow.register(&desired, &options).await?
    };

    if let RegistrationOutcome::Registered {
        device_id,
        name,
        group,
        ..
    } = &outcome
    {
        println!(
            "{} registered '{}' in group '{}' with device id {} at {}",
            "Success:".green().bold(),
            name.cyan(),
            group,
            device_id.to_string().bold(),
            ctx.api_url
        );
    }

    Ok(outcome)
}

/// What to register as; unset name/password are generated per attempt.
pub fn desired_identity(ctx: &Context, cli: &Cli) -> DesiredIdentity {
    DesiredIdentity {
        name: cli.name.clone(),
        group: cli
            .group
            .clone()
            .unwrap_or_else(|| ctx.config.default_group.clone()),
        password: cli.password.clone(),
    }
}

/// Node-id handling for this run; the test API gets its own `-test` prefix.
pub fn register_options(ctx: &Context, cli: &Cli) -> RegisterOptions {
    let mut prefix = cli
        .prefix
        .clone()
        .unwrap_or_else(|| ctx.config.node_id_prefix.clone());
    if cli.test_api {
        prefix.push_str("-test");
    }

    RegisterOptions {
        ignore_node_id: cli.ignore_node_id,
        remove_device_config: cli.remove_device_config,
        node_id_prefix: prefix,
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C"),
        () = terminate => info!("received SIGTERM"),
    }
}
