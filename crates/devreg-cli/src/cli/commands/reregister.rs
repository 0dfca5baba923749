//! `device-register --reregister` - rename without a new identity.

use anyhow::Result;
use colored::Colorize;
use devreg::{IdentityUpdate, RegistrationWorkflow};

use super::Context;
use crate::cli::args::Cli;

pub async fn execute(ctx: &Context, cli: &Cli, workflow: &RegistrationWorkflow) -> Result<()> {
    let identity = workflow.reregister(&identity_update(cli)).await?;

    println!(
        "{} device {} is now '{}' in group '{}' at {}",
        "Success:".green().bold(),
        identity.id.to_string().bold(),
        identity.name.cyan(),
        identity.group,
        ctx.api_url
    );
    Ok(())
}

/// Fields to change; anything not given on the command line is kept.
pub fn identity_update(cli: &Cli) -> IdentityUpdate {
    IdentityUpdate {
        name: cli.name.clone(),
        group: cli.group.clone(),
        password: cli.password.clone(),
    }
}
