//! Daemon configuration with TOML file support.

use ballot_election::{ConfigError, ElectionConfig};
use ballot_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a daemon run.
///
/// Can be loaded from a TOML file via [`DaemonConfig::from_toml_file`]; CLI
/// flags and environment variables override the file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Events buffered for subscribers before slow ones start lagging.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(default)]
    pub election: ElectionConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_capacity() -> usize {
    256
}

impl DaemonConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            event_capacity: default_event_capacity(),
            election: ElectionConfig::default(),
        }
    }
}
