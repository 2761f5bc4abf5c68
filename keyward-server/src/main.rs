//! # Keyward Server
//!
//! Serves the identity core (accounts, roles, memberships and session
//! tokens) over HTTP. All state is in memory and lost on restart.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use keyward_config::{ConfigLoad, ConfigLoader, ConfigOverrides};
use keyward_server::{
    AppState, create_router,
    infra::startup::{build_identity, init_tracing, log_config, start_sweeper},
};
use tracing::info;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "keyward-server")]
#[command(about = "In-memory identity service: accounts, roles and session tokens")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Session lifetime in seconds (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    session_lifetime: Option<u64>,

    /// Run the background session sweeper regardless of config
    #[arg(long)]
    sweep: bool,
}

impl Cli {
    fn loader(&self) -> ConfigLoader {
        let mut loader = ConfigLoader::new().with_overrides(ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            session_lifetime_secs: self.session_lifetime,
            sweep_enabled: self.sweep.then_some(true),
        });
        if let Some(path) = &self.config {
            loader = loader.with_config_path(path);
        }
        if let Some(path) = &self.env_file {
            loader = loader.with_env_file(path);
        }
        loader
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let ConfigLoad { config, warnings } = cli
        .loader()
        .load()
        .context("failed to load configuration")?;

    init_tracing();
    log_config(&config, &warnings);

    let identity = build_identity(&config)?;
    let sweeper = start_sweeper(&config, &identity);

    let app = create_router(AppState::new(identity));
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "keyward-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("keyward-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
