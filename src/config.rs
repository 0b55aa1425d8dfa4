//! Game configuration
//!
//! Loaded from an optional JSON file; command line flags override file values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::ROUND_DURATION_MS;

fn default_round_duration_ms() -> u64 {
    ROUND_DURATION_MS
}

fn default_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Round length before an unmatched target expires
    #[serde(default = "default_round_duration_ms")]
    pub round_duration_ms: u64,

    /// Seed for target selection; random games when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Listen address for the API server
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_duration_ms: default_round_duration_ms(),
            seed: None,
            addr: default_addr(),
            log_filter: default_log_filter(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::ParseFailed {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the game cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "round_duration_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn round_duration(&self) -> Duration {
        Duration::from_millis(self.round_duration_ms)
    }
}
