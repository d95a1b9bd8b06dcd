//! Cornerman CLI — the main entry point.
//!
//! Commands:
//! - `chat`        — Interactive console assistant
//! - `ask`         — Single-message mode
//! - `build-index` — Build the knowledge index from the document folder

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "cornerman",
    about = "Cornerman — asistente de productos y políticas con recuperación de documentos",
    version
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
    /// Chat interactively with the assistant
    Chat,

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        #[arg(short, long)]
        message: String,
    },

    /// Build the knowledge index from the document folder
    BuildIndex {
        /// Override the document folder
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Override the output artifact directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat => commands::chat::run().await?,
        Commands::Ask { message } => commands::ask::run(&message).await?,
        Commands::BuildIndex { docs, out } => commands::build_index::run(docs, out).await?,
    }

    Ok(())
}
