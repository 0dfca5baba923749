//! Host-level side effects.

use devreg::{DevRegError, Result, SystemControl};
use std::process::Command;
use tracing::info;

/// [`SystemControl`] for the real host
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSystem;

impl SystemControl for HostSystem {
    fn reboot(&self) -> Result<()> {
        info!("restarting device");
        let status = Command::new("reboot")
            .status()
            .map_err(|e| DevRegError::System(format!("reboot: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(DevRegError::System(format!("reboot exited with {status}")))
        }
    }

    fn exit_process(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}
