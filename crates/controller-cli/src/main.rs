mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, LogFormat};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let fmt = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_target(false);
    match cli.log_format {
        LogFormat::Pretty => fmt.init(),
        LogFormat::Json => fmt.json().init(),
    }

    match cli.command {
        Command::Serve { bind, port, store_path, manifest_dir, ephemeral } => {
            commands::serve(bind, port, store_path, manifest_dir, ephemeral).await
        }
        Command::Seed { store_path, manifest_dir } => commands::seed_command(store_path, manifest_dir).await,
    }
}
