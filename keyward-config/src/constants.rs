use std::time::Duration;

/// Placeholder pepper used when none is configured. Never suitable outside
/// local development.
pub const DEFAULT_PASSWORD_PEPPER: &str = "keyward-dev-password-pepper";
/// Placeholder HMAC key used when none is configured.
pub const DEFAULT_TOKEN_KEY: &str = "keyward-dev-token-key";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "KEYWARD_CONFIG";
