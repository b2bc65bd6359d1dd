//! Configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{TallyError, ZoneKey};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Zones that may hold tasks. Empty accepts any zone name.
    #[serde(default)]
    pub zones: Vec<String>,

    /// How often clients are told to poll. Also the documented staleness
    /// window between the true state and what a device shows.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_log_filter() -> String {
    "tally=info,tally_core=info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            poll_interval_ms: default_poll_interval_ms(),
            log: LogConfig::default(),
        }
    }
}

impl TallyConfig {
    pub fn load(path: &Path) -> Result<Self, TallyError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TallyError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TallyError> {
        let config: TallyConfig =
            toml::from_str(content).map_err(|e| TallyError::Config(e.to_string()))?;
        config.zone_keys()?;
        Ok(config)
    }

    /// Canonical allow-list. Fails on a blank entry.
    pub fn zone_keys(&self) -> Result<Vec<ZoneKey>, TallyError> {
        self.zones.iter().map(|z| ZoneKey::parse(z)).collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
