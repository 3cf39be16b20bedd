//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use textenrich::config::Config;

#[derive(Parser)]
#[command(name = "textenrich")]
#[command(about = "Enrich JSON documents using a text analytics service")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured stages over JSON documents
    Run {
        /// Input files: a JSON object, a JSON array of objects, or JSON lines ("-" for stdin)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Number of documents processed concurrently (default: from config)
        #[arg(short, long)]
        workers: Option<usize>,
        /// Write enriched documents here as JSON lines (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration and ping the service
    Check,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::load_from_path(path).await?
        }
        None => Config::load().await?,
    };

    match cli.command {
        Commands::Run {
            inputs,
            workers,
            output,
        } => run::cmd_run(&config, &inputs, workers, output.as_deref()).await,
        Commands::Check => check::cmd_check(&config).await,
    }
}
