//! sactl - Azure Storage Account Lifecycle Tool
//!
//! A command-line tool for managing Azure storage accounts,
//! written in Rust for performance, safety, and reliability.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sactl::cli::{Cli, Commands};
use sactl::config;
use sactl::error::Result;

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the command
    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting sactl");

    // Config subcommands must work before a valid config exists
    let config = match &cli.command {
        Commands::Config { .. } => config::load_config_unvalidated().await?,
        _ => config::load_config().await?,
    };

    cli.execute(config).await?;

    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sactl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
