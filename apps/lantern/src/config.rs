//! # Configuration
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <path>`, or `lantern.toml` in the working directory)
//! 3. Environment (`LANTERN_HOST`, `LANTERN_PORT`, `LANTERN_LOG_FORMAT`)
//! 4. Command-line flags

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "lantern.toml";

pub const ENV_HOST: &str = "LANTERN_HOST";
pub const ENV_PORT: &str = "LANTERN_PORT";
pub const ENV_LOG_FORMAT: &str = "LANTERN_LOG_FORMAT";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value `{value}` for {name}")]
    Env { name: &'static str, value: String },
}

// =============================================================================
// CONFIG
// =============================================================================

/// Structured log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn from_env(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Per-request deadline for the remote store.
    pub timeout_secs: u64,
    /// Keep an interactive history file.
    pub history: bool,
    /// Defaults to `$HOME/.lantern_history`.
    pub history_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6380,
            timeout_secs: 10,
            history: true,
            history_file: None,
            log_format: LogFormat::Text,
        }
    }
}

/// Values taken from command-line flags. `None` keeps the lower layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub no_history: bool,
}

impl Config {
    /// Parse a TOML document over the defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read `path`, or `lantern.toml` if it exists, or fall back to defaults.
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.is_file() {
                    return Ok(Self::default());
                }
                local
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&text)
            .map_err(|source| ConfigError::Parse { path, source })
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST).filter(|host| !host.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|_| ConfigError::Env {
                name: ENV_PORT,
                value: port,
            })?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = LogFormat::from_env(format.trim()).ok_or(ConfigError::Env {
                name: ENV_LOG_FORMAT,
                value: format,
            })?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(host) = &overrides.host {
            self.host.clone_from(host);
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if overrides.no_history {
            self.history = false;
        }
    }

    /// All layers against the process environment.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Where interactive history lives, if it is kept at all.
    #[must_use]
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.history {
            return None;
        }
        self.history_file.clone().or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".lantern_history"))
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
