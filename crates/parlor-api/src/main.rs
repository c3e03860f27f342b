//! Parlor CLI and HTTP API entry point.
//!
//! Binary name: `parlor`
//!
//! Parses CLI arguments, loads configuration, initializes tracing and the
//! database, then runs the server or the requested command.

use clap::Parser;
use clap_complete::generate;

use parlor_api::cli::{self, Cli, Commands};
use parlor_api::state::AppState;
use parlor_infra::config::{apply_env_overrides, load_config_or_default};
use parlor_infra::filesystem::resolve_data_dir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parlor", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let (mut config, config_error) = load_config_or_default(&data_dir).await;
    apply_env_overrides(&mut config);
    if cli.quiet {
        config.logging.filter = "error".to_string();
    }
    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    let _tracing = parlor_observe::init_tracing(&config.logging, cli.verbose)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    match config_error {
        Some(err) => tracing::warn!(error = %err, "Invalid config.toml, using defaults"),
        None => tracing::debug!(data_dir = %data_dir.display(), "Configuration loaded"),
    }

    let state = AppState::init(data_dir, config).await?;

    match cli.command {
        Commands::Serve { .. } => cli::serve::run(state).await?,
        Commands::Import { from } => cli::import::run(&state, &from, cli.json).await?,
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
