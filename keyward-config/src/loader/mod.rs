pub mod error;

pub use error::ConfigLoadError;

use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use keyward_core::{
    CryptoError, HashCost, LifetimeError, SessionLifetime,
};

use crate::{
    constants::{
        DEFAULT_HOST, DEFAULT_PASSWORD_PEPPER, DEFAULT_PORT,
        DEFAULT_SWEEP_INTERVAL, DEFAULT_TOKEN_KEY,
    },
    models::{
        AuthConfig, Config, ConfigMetadata, ServerConfig, SweeperConfig,
        sources::{EnvConfig, FileConfig},
    },
    util::parse_duration,
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("keyward.toml"),
        PathBuf::from("config/keyward.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Values supplied on the command line. They win over every other source.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub session_lifetime_secs: Option<u64>,
    pub sweep_enabled: Option<bool>,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

/// Builds a [`Config`] from defaults, an optional TOML file, a `.env` file,
/// the process environment and CLI overrides, in increasing precedence.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self {
            options,
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (dotenv, env_file_loaded) = self.read_env_file()?;

        // Process environment takes precedence over the .env file.
        let env = EnvConfig::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
        })?;

        let (file_config, config_path) = self.load_file_config(&env)?;

        self.compose(
            file_config,
            env,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )
    }

    /// Merge sources that were already read. Exposed so callers (and tests) can
    /// feed sources without touching the filesystem or environment.
    pub fn compose(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        metadata: ConfigMetadata,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if file_config.is_none() {
            warnings.push_with_hint(
                "No keyward.toml detected; using defaults and environment variables",
                "Create keyward.toml or set KEYWARD_CONFIG to point at one",
            );
        }

        let FileConfig {
            server: file_server,
            auth: file_auth,
            sweeper: file_sweeper,
        } = file_config.unwrap_or_default();
        let overrides = self.overrides.clone();

        let server = ServerConfig {
            host: overrides
                .host
                .or(env.server_host)
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides
                .port
                .or(env.server_port)
                .or(file_server.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let lifetime_secs = overrides
            .session_lifetime_secs
            .or(env.session_lifetime_secs)
            .or(file_auth.session_lifetime_secs)
            .unwrap_or(SessionLifetime::DEFAULT_SECS);
        let session_lifetime = SessionLifetime::from_secs(lifetime_secs)
            .map_err(|err| match err {
                LifetimeError::Zero => {
                    ConfigGuardRailError::ZeroSessionLifetime
                }
                LifetimeError::OutOfRange(secs) => {
                    ConfigGuardRailError::SessionLifetimeOutOfRange(secs)
                }
            })?;

        let hash_cost = HashCost {
            memory_kib: env
                .hash_memory_kib
                .or(file_auth.hash.memory_kib)
                .unwrap_or(HashCost::STRONG.memory_kib),
            iterations: env
                .hash_iterations
                .or(file_auth.hash.iterations)
                .unwrap_or(HashCost::STRONG.iterations),
            parallelism: env
                .hash_parallelism
                .or(file_auth.hash.parallelism)
                .unwrap_or(HashCost::STRONG.parallelism),
        };
        check_hash_cost(&hash_cost)?;

        let auth = AuthConfig {
            password_pepper: env
                .auth_password_pepper
                .or(file_auth.password_pepper)
                .unwrap_or_else(|| DEFAULT_PASSWORD_PEPPER.to_string()),
            token_key: env
                .auth_token_key
                .or(file_auth.token_key)
                .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
            session_lifetime,
            hash_cost,
        };

        let file_interval = file_sweeper
            .interval
            .as_deref()
            .map(parse_duration)
            .transpose()
            .map_err(|reason| ConfigLoadError::InvalidValue {
                key: "sweeper.interval",
                reason,
            })?;

        let sweeper = SweeperConfig {
            enabled: overrides
                .sweep_enabled
                .or(env.sweep_enabled)
                .or(file_sweeper.enabled)
                .unwrap_or(false),
            interval: env
                .sweep_interval
                .or(file_interval)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
        };

        let config = Config {
            server,
            auth,
            sweeper,
            metadata,
        };

        let guard_warnings = validation::apply_guard_rails(&config)?;
        warnings.items.extend(guard_warnings.items);

        Ok(ConfigLoad { config, warnings })
    }

    fn read_env_file(
        &self,
    ) -> Result<(HashMap<String, String>, bool), ConfigLoadError> {
        let path = self
            .options
            .env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(".env"));

        let iter = match dotenvy::from_path_iter(&path) {
            Ok(iter) => iter,
            Err(dotenvy::Error::Io(_)) => return Ok((HashMap::new(), false)),
            Err(err) => return Err(err.into()),
        };

        let vars = iter.collect::<Result<HashMap<_, _>, _>>()?;
        Ok((vars, true))
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn check_hash_cost(cost: &HashCost) -> Result<(), ConfigGuardRailError> {
    cost.check().map_err(|err| match err {
        CryptoError::InvalidHashCost(reason) => {
            ConfigGuardRailError::InvalidHashCost { reason }
        }
        other => ConfigGuardRailError::InvalidHashCost {
            reason: other.to_string(),
        },
    })
}
