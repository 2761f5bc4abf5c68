use thiserror::Error;

use crate::models::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("server port must not be 0")]
    ZeroPort,
    #[error("session lifetime must be greater than zero seconds")]
    ZeroSessionLifetime,
    #[error("session lifetime of {0} seconds is out of range")]
    SessionLifetimeOutOfRange(u64),
    #[error("session sweep interval must be greater than zero")]
    ZeroSweepInterval,
    #[error("authentication secret {field} must not be empty")]
    EmptySecret { field: &'static str },
    #[error("invalid Argon2 cost: {reason}")]
    InvalidHashCost { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Checks that can only run on the fully composed configuration.
///
/// Hard failures come back as errors; placeholder secrets are tolerated with
/// a warning so a bare checkout still starts.
pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.server.port == 0 {
        return Err(ConfigGuardRailError::ZeroPort);
    }

    if config.sweeper.interval.is_zero() {
        return Err(ConfigGuardRailError::ZeroSweepInterval);
    }

    let auth = &config.auth;
    if auth.password_pepper.is_empty() {
        return Err(ConfigGuardRailError::EmptySecret {
            field: "AUTH_PASSWORD_PEPPER",
        });
    }
    if auth.token_key.is_empty() {
        return Err(ConfigGuardRailError::EmptySecret {
            field: "AUTH_TOKEN_KEY",
        });
    }

    if auth.is_default_pepper() {
        warnings.push_with_hint(
            "AUTH_PASSWORD_PEPPER uses the built-in development value",
            "Set AUTH_PASSWORD_PEPPER to a long random secret before exposing the server",
        );
    }
    if auth.is_default_token_key() {
        warnings.push_with_hint(
            "AUTH_TOKEN_KEY uses the built-in development value",
            "Set AUTH_TOKEN_KEY to a long random secret before exposing the server",
        );
    }

    if !config.sweeper.enabled {
        warnings.push_with_hint(
            "Session sweeper disabled; expired sessions are only removed when presented",
            "Set SESSION_SWEEP_ENABLED=true to purge them periodically",
        );
    }

    Ok(warnings)
}
