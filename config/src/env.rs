use crate::AppConfig;

const API_BASE_VARS: [&str; 2] = ["RABBIT_API_BASE", "VITE_API_BASE"];
const DEBUG_VARS: [&str; 2] = ["RABBIT_DEBUG", "VITE_DEBUG"];
const WRITE_ENV_VARS: [&str; 2] = ["RABBIT_WRITE_ENV_ON_START", "VITE_WRITE_ENV_ON_START"];

/// Parse a boolean switch as written in an environment variable.
///
/// `1`, `true`, `yes` and `on` (any case) are on; everything else is off.
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Command-line switches layered over the environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub debug: bool,
    pub write_env: bool,
    pub api_base: Option<String>,
}

/// The build-time configuration of the console.
///
/// Precedence for each value: command-line override, then `RABBIT_*`, then
/// the legacy `VITE_*` name, then `~/.rabbit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    api_base: String,
    debug: bool,
    debug_raw: Option<String>,
    write_env_on_start: bool,
}

impl BuildEnv {
    /// A fixed environment, mostly useful in tests.
    #[must_use]
    pub fn new(api_base: impl Into<String>, debug: bool) -> Self {
        Self {
            api_base: api_base.into(),
            debug,
            debug_raw: None,
            write_env_on_start: false,
        }
    }

    /// Read the process environment.
    #[must_use]
    pub fn from_process(file: Option<&AppConfig>) -> Self {
        Self::from_lookup(|name| std::env::var(name).ok(), file)
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, file: Option<&AppConfig>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        };

        let api_base = first(&API_BASE_VARS[..])
            .or_else(|| file.and_then(|app| app.api_base.clone()))
            .unwrap_or_default();

        let debug_raw = first(&DEBUG_VARS[..]);
        let debug = match &debug_raw {
            Some(raw) => parse_flag(raw),
            None => file.and_then(|app| app.debug).unwrap_or(false),
        };

        let write_env_on_start = match first(&WRITE_ENV_VARS[..]) {
            Some(raw) => parse_flag(&raw),
            None => file.and_then(|app| app.write_env_on_start).unwrap_or(false),
        };

        Self {
            api_base,
            debug,
            debug_raw,
            write_env_on_start,
        }
    }

    /// Apply command-line switches. Flags only ever turn features on.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &EnvOverrides) -> Self {
        if overrides.debug {
            self.debug = true;
        }
        if overrides.write_env {
            self.write_env_on_start = true;
        }
        if let Some(api_base) = overrides
            .api_base
            .as_deref()
            .filter(|value| !value.trim().is_empty())
        {
            self.api_base = api_base.to_string();
        }
        self
    }

    /// The configured default API base, before normalisation.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The debug variable exactly as found in the environment.
    #[must_use]
    pub fn debug_raw(&self) -> Option<&str> {
        self.debug_raw.as_deref()
    }

    #[must_use]
    pub fn write_env_on_start(&self) -> bool {
        self.write_env_on_start
    }
}
