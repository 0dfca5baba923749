//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

/// Register this device with the fleet-management backend
///
/// Waits for a network connection, registers (or re-registers) the device,
/// saves its identity and writes the node id used by the configuration
/// agent. Exits quietly if the device is already registered.
#[derive(Parser, Debug)]
#[command(name = "device-register")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Reboot the device after registering
    #[arg(short, long)]
    pub reboot: bool,

    /// URL of the API server to register with
    #[arg(short, long, value_name = "URL")]
    pub api: Option<String>,

    /// Don't read or write the node id file
    #[arg(short, long)]
    pub ignore_node_id: bool,

    /// Remove the device config first, to register as a new device or with a
    /// different server. Usually wants --ignore-node-id as well
    #[arg(short = 'd', long)]
    pub remove_device_config: bool,

    /// Use the test API; overrides --api
    #[arg(short, long)]
    pub test_api: bool,

    /// Rename the device on the same API, keeping its ID
    #[arg(long, conflicts_with_all = ["remove_device_config", "retry_until_registered"])]
    pub reregister: bool,

    /// Group name
    #[arg(short, long)]
    pub group: Option<String>,

    /// Device name; a random one is generated if not given
    #[arg(short, long)]
    pub name: Option<String>,

    /// Device password; a random one is generated if not given
    #[arg(short, long, env = "DEVICE_REGISTER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Prefix used in the node id
    #[arg(long)]
    pub prefix: Option<String>,

    /// Keep trying until the device is registered
    #[arg(long)]
    pub retry_until_registered: bool,

    /// Config file (default: per-user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long)]
    pub verbose: bool,
}
