//! The `hydroscope serve` command.

use clap::Args;
use hydroscope_core::server::{self, AppState};
use hydroscope_core::{init_model_client, Analyzer, Config};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Exit if the Vertex AI client cannot be initialized
    #[arg(long)]
    pub strict: bool,
}

/// Apply CLI overrides on top of the loaded config.
fn apply_overrides(args: &ServeArgs, config: &mut Config) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.strict {
        config.server.require_model_client = true;
    }
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);
    config.validate()?;

    let model = init_model_client(&config)?;
    let state = AppState::new(Analyzer::new(model));

    server::serve(&config.server, state).await?;
    Ok(())
}
