use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::{
    constants::CONFIG_PATH_ENV,
    loader::ConfigLoadError,
    util::{parse_bool, parse_duration, parse_number},
};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub sweeper: FileSweeperConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_lifetime_secs: Option<u64>,
    #[serde(default)]
    pub hash: FileHashConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileHashConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_kib: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileSweeperConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Humantime string, e.g. `"5m"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub session_lifetime_secs: Option<u64>,
    pub auth_password_pepper: Option<String>,
    pub auth_token_key: Option<String>,
    pub hash_memory_kib: Option<u32>,
    pub hash_iterations: Option<u32>,
    pub hash_parallelism: Option<u32>,
    pub sweep_enabled: Option<bool>,
    pub sweep_interval: Option<Duration>,
}

impl EnvConfig {
    /// Read through an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key).filter(|value| !value.trim().is_empty())
        };

        Ok(Self {
            config_path: var(CONFIG_PATH_ENV).map(PathBuf::from),
            server_host: var("SERVER_HOST"),
            server_port: parsed(&var, "SERVER_PORT", parse_number)?,
            session_lifetime_secs: parsed(
                &var,
                "SESSION_LIFETIME_SECS",
                parse_number,
            )?,
            auth_password_pepper: var("AUTH_PASSWORD_PEPPER"),
            auth_token_key: var("AUTH_TOKEN_KEY"),
            hash_memory_kib: parsed(
                &var,
                "AUTH_HASH_MEMORY_KIB",
                parse_number,
            )?,
            hash_iterations: parsed(
                &var,
                "AUTH_HASH_ITERATIONS",
                parse_number,
            )?,
            hash_parallelism: parsed(
                &var,
                "AUTH_HASH_PARALLELISM",
                parse_number,
            )?,
            sweep_enabled: parsed(&var, "SESSION_SWEEP_ENABLED", |raw| {
                parse_bool(raw).ok_or_else(|| {
                    "expected a boolean such as true/false".into()
                })
            })?,
            sweep_interval: parsed(
                &var,
                "SESSION_SWEEP_INTERVAL",
                parse_duration,
            )?,
        })
    }
}

fn parsed<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ConfigLoadError> {
    var(key)
        .map(|raw| {
            parse(&raw).map_err(|reason| ConfigLoadError::InvalidEnv {
                key,
                value: raw.clone(),
                reason,
            })
        })
        .transpose()
}
