//! Configuration loading for Keyward.
//!
//! Sources are layered, lowest precedence first: built-in defaults, a TOML
//! file, a `.env` file, the process environment, then CLI overrides. The
//! composed result is validated once; hard problems are errors, risky but
//! workable settings come back as [`ConfigWarnings`].

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, ConfigOverrides,
    error::ConfigLoadError,
};
pub use models::{
    AuthConfig, Config, ConfigMetadata, ServerConfig, SweeperConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
