//! device-register - register this device with the fleet-management backend
//! and keep the local identity and node id in step.

use devreg::SystemControl;
use devreg_cli::system::HostSystem;

#[tokio::main]
async fn main() {
    let system = HostSystem;
    let code = match devreg_cli::run(&system).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };
    system.exit_process(code)
}
