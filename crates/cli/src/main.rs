//! Onboarding Buddy CLI — the main entry point.
//!
//! Commands:
//! - `init`    — Write a starter config file
//! - `chat`    — Password, details form, then interactive chat
//! - `serve`   — Start the HTTP gateway
//! - `index`   — Rebuild the on-disk index standalone and report its size
//! - `doctor`  — Diagnose configuration and data files

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "onboarding-buddy",
    about = "Onboarding Buddy — an induction chatbot for new joiners",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from this file instead of ~/.onboarding-buddy/config.toml
    #[arg(short, long, global = true, env = "ONBOARDING_BUDDY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    Init,

    /// Chat with the buddy in the terminal
    Chat,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Rebuild the on-disk knowledge index standalone and report its size.
    ///
    /// `chat` and `serve` still build their own index once per process.
    Index,

    /// Diagnose configuration and data files
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init => commands::init::run(config_path).await?,
        Commands::Chat => commands::chat::run(config_path).await?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Index => commands::index::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
