//! docflow CLI - ingest documents into a vector store.
//!
//! # Usage
//!
//! ```bash
//! # Ingest a directory into a Qdrant collection
//! docflow ingest ./contracts --collection contracts
//!
//! # Walk subdirectories, run everything in memory
//! docflow ingest ./inbox --recursive --dry-run
//!
//! # Check a configuration file
//! docflow validate-config ./docflow.json
//! ```

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Document ingestion pipeline: extract, clean, chunk, embed, store.
#[derive(Parser, Debug)]
#[command(name = "docflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest files or directories
    Ingest(IngestArgs),

    /// Validate a configuration file and exit
    #[command(name = "validate-config")]
    ValidateConfig {
        /// Path to the configuration file
        path: PathBuf,
    },

    /// Print the effective configuration with credentials masked
    #[command(name = "show-config")]
    ShowConfig {
        /// Configuration file (default: platform config directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Files or directories to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Configuration file (default: platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Vector store URL
    #[arg(long, env = "DOCFLOW_STORE_URL")]
    pub store_url: Option<String>,

    /// Vector store API key
    #[arg(long, env = "DOCFLOW_STORE_API_KEY", hide_env_values = true)]
    pub store_api_key: Option<String>,

    /// Target collection
    #[arg(long, env = "DOCFLOW_COLLECTION")]
    pub collection: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Files processed concurrently (default: from config)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Use the hash embedder and an in-memory store; nothing leaves the process
    #[arg(long)]
    pub dry_run: bool,

    /// Print the final job snapshots as JSON
    #[arg(long)]
    pub json: bool,
}

fn init_logging(json: bool, verbose: bool) {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }

    let default_filter = if verbose { "docflow=debug" } else { "docflow=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
    } else {
        tracing::subscriber::set_global_default(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
        )
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.json_logs, cli.verbose);

    let result = match cli.command {
        Commands::Ingest(args) => commands::ingest(args).await,
        Commands::ValidateConfig { path } => commands::validate_config(&path),
        Commands::ShowConfig { config } => commands::show_config(config.as_deref()),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
