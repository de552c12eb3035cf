//! assetlens CLI - scan image folders into a searchable, model-tagged catalog.
//!
//! Every image in a folder is run through metadata extraction, dominant color
//! classification, and an ONNX tagging model. The resulting records can be
//! written as JSON or searched by keyword.
//!
//! # Usage
//!
//! ```bash
//! # Scan a folder and write records
//! assetlens scan ./assets --model models/image_model.onnx --output catalog.jsonl --format jsonl
//!
//! # Scan, then search interactively
//! assetlens search ./assets
//!
//! # One-shot search
//! assetlens search ./assets canon
//!
//! # View configuration
//! assetlens config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// assetlens - scan image folders into a searchable, model-tagged catalog.
#[derive(Parser, Debug)]
#[command(name = "assetlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory and write one record per image
    Scan(cli::scan::ScanArgs),

    /// Scan a directory, then search it by keyword
    Search(cli::search::SearchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match assetlens_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `assetlens config path`."
            );
            assetlens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("assetlens v{}", assetlens_core::VERSION);

    match cli.command {
        Commands::Scan(args) => cli::scan::execute(args, config).await,
        Commands::Search(args) => cli::search::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
