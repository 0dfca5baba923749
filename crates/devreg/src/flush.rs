//! Settling telemetry queued under the current identity before that
//! identity is removed or renamed.

use async_trait::async_trait;
use devreg_core::{DevRegError, Result, TelemetryFlush};
use tracing::{info, warn};

/// Explicitly skips the flush
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipFlush;

#[async_trait]
impl TelemetryFlush for SkipFlush {
    async fn flush(&self) -> Result<()> {
        info!("no telemetry flush configured, skipping");
        Ok(())
    }
}

/// Runs an external command that uploads queued events and exits zero on
/// success
#[derive(Debug, Clone)]
pub struct CommandFlush {
    program: String,
    args: Vec<String>,
}

impl CommandFlush {
    /// Command to run, as `program` plus `args`
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a full argv; `None` if it is empty
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }
}

#[async_trait]
impl TelemetryFlush for CommandFlush {
    async fn flush(&self) -> Result<()> {
        info!(program = %self.program, "flushing queued telemetry");
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .status()
            .await
            .map_err(|e| DevRegError::Flush(format!("{}: {e}", self.program)))?;

        if status.success() {
            Ok(())
        } else {
            warn!(program = %self.program, %status, "telemetry flush command failed");
            Err(DevRegError::Flush(format!("{} exited with {status}", self.program)))
        }
    }
}
