//! Configuration for the RabbitRelay console.
//!
//! Three layers feed a running client:
//!
//! - [`BuildEnv`]: the API base and debug flags from `RABBIT_*`/`VITE_*`
//!   environment variables, falling back to `~/.rabbit/config.toml`.
//! - [`LocalStore`]: the small persisted key/value store holding dev
//!   credentials, the admin token and the API base override.
//! - [`write_env_on_start`]: the diagnostic copy of the build environment
//!   into the local store.

mod env;
mod file;
mod store;
mod writeback;

use std::path::PathBuf;

pub use env::{BuildEnv, EnvOverrides, parse_flag};
pub use file::{AppConfig, ConsoleConfig, config_path};
pub use store::{KeyValueStore, LocalStore, MemoryStore, StoreError, StoreKey, local_store_path};
pub use writeback::{EnvSnapshot, write_env_on_start};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// `~/.rabbit`, the directory holding the config file, local store and logs.
#[must_use]
pub fn rabbit_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rabbit"))
}
