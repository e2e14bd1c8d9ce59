//! CLI entry point for the check-in device tools.

pub mod device;

use clap::{Parser, Subcommand};

/// Ryfty check-in CLI
#[derive(Parser, Debug)]
#[command(name = "ryfty-auth", version, about = "Ryfty check-in device authorization")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check-in device authorization
    Device(DeviceArgs),
}

/// Arguments for the `device` subcommand group.
#[derive(Parser, Debug)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommands,
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommands {
    /// Verify a device token and store the authorization
    Verify(VerifyArgs),
    /// Show the active device authorization
    Status,
    /// Remove the active device authorization
    Forget,
}

/// Arguments for `ryfty-auth device verify`.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Device token, or the scanned URL carrying it as `?token=`
    pub token: String,
}
