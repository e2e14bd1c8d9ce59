//! Ryfty check-in CLI binary entry point.

use clap::Parser;
use ryfty_auth::cli::{Cli, Commands, DeviceCommands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ryfty_auth=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Device(device_args) => match device_args.command {
            DeviceCommands::Verify(args) => ryfty_auth::cli::device::handle_verify(&args.token).await,
            DeviceCommands::Status => ryfty_auth::cli::device::handle_status().await,
            DeviceCommands::Forget => ryfty_auth::cli::device::handle_forget().await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
