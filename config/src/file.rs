use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{ConfigError, rabbit_dir};

/// Parsed `~/.rabbit/config.toml`. Every field is optional; environment
/// variables take precedence over anything set here.
#[derive(Debug, Default, Deserialize)]
pub struct ConsoleConfig {
    pub app: Option<AppConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AppConfig {
    /// Default backend origin, normalised at request time.
    pub api_base: Option<String>,
    pub debug: Option<bool>,
    /// Copy the build API base into the local store at startup.
    pub write_env_on_start: Option<bool>,
}

impl ConsoleConfig {
    /// Load the config file from its default location.
    ///
    /// A missing file (or an undeterminable home directory) is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn app(&self) -> Option<&AppConfig> {
        self.app.as_ref()
    }
}

pub fn config_path() -> Option<PathBuf> {
    rabbit_dir().map(|dir| dir.join("config.toml"))
}
