//! Hydroscope CLI - water sample image analysis service.
//!
//! Hydroscope runs an HTTP API that accepts a microscope image of a water
//! sample and returns a short contaminant report generated by Vertex AI.
//!
//! # Usage
//!
//! ```bash
//! # Start the API on the configured host and port
//! hydroscope serve
//!
//! # Override the port, refuse to start without a working model client
//! hydroscope serve --port 9000 --strict
//!
//! # View configuration
//! hydroscope config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Hydroscope - water sample image analysis service.
#[derive(Parser, Debug)]
#[command(name = "hydroscope")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "HYDROSCOPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli::config_path(cli.config.as_deref());

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match hydroscope_core::Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config from {}: {e}\n  \
                 Using default configuration. Check your config file with `hydroscope config path`.",
                config_path.display()
            );
            hydroscope_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Hydroscope v{}", hydroscope_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config_path).await,
    }
}
