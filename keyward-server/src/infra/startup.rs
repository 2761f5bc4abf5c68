use std::sync::Arc;

use anyhow::{Context, Result};
use keyward_config::{Config, ConfigWarnings};
use keyward_core::{AuthCrypto, Identity, SessionSweeper};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn log_config(config: &Config, warnings: &ConfigWarnings) {
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "loaded configuration file");
    }
    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }

    if warnings.is_empty() {
        debug!("configuration passed all guard rails");
    }
    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(
                    message = %warning.message,
                    hint = %hint,
                    "configuration warning"
                )
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }
}

/// Build the identity core from resolved configuration.
pub fn build_identity(config: &Config) -> Result<Identity> {
    let auth = &config.auth;
    let crypto = AuthCrypto::with_cost(
        auth.password_pepper.as_bytes(),
        auth.token_key.as_bytes(),
        auth.hash_cost,
    )
    .context("failed to initialise auth crypto")?;

    info!(
        session_lifetime_secs = auth.session_lifetime.as_secs(),
        memory_kib = auth.hash_cost.memory_kib,
        iterations = auth.hash_cost.iterations,
        "identity core ready"
    );

    Ok(Identity::new(Arc::new(crypto), auth.session_lifetime))
}

/// Start the background session sweeper when enabled.
pub fn start_sweeper(
    config: &Config,
    identity: &Identity,
) -> Option<JoinHandle<()>> {
    if !config.sweeper.enabled {
        return None;
    }

    let sweeper = SessionSweeper::new(
        identity.session_manager(),
        config.sweeper.interval,
    );
    info!(
        interval_secs = sweeper.interval().as_secs(),
        "session sweeper started"
    );
    Some(sweeper.start())
}
