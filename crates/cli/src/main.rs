//! snap2pdf CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Start the bot (long polling until Ctrl-C)
//! - `onboard`  — Write a default config and create the data directory
//! - `doctor`   — Diagnose configuration, storage and the bot token

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "snap2pdf",
    about = "snap2pdf — turn photos sent to a Telegram bot into a PDF",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Config file (defaults to ~/.snap2pdf/config.toml)
        #[arg(short, long, env = "SNAP2PDF_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Initialize configuration and data directory
    Onboard,

    /// Diagnose system health
    Doctor {
        /// Config file (defaults to ~/.snap2pdf/config.toml)
        #[arg(short, long, env = "SNAP2PDF_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { config } => commands::run::run(config).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor { config } => commands::doctor::run(config).await?,
    }

    Ok(())
}
