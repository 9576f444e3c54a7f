use serde::{Deserialize, Serialize};
use std::path::Path;
use utoipa::ToSchema;

/// A monitored station, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Upstream station identifier (evaId)
    pub eva_id: u64,
    /// Human-readable label shown on the board
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub stations: Vec<Station>,
    /// Allowed CORS origins. Required unless cors_permissive is true.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Explicitly allow all origins (development only). Defaults to false.
    #[serde(default)]
    pub cors_permissive: bool,
    /// Port to listen on (default: 3000)
    #[serde(default = "Config::default_port")]
    pub port: u16,
    /// Station board sync configuration
    #[serde(default)]
    pub board_sync: BoardSyncConfig,
}

/// Configuration for the station board refresh cycle
#[derive(Debug, Clone, Deserialize)]
pub struct BoardSyncConfig {
    /// Interval in seconds between fetch cycles per station (default: 60)
    #[serde(default = "BoardSyncConfig::default_interval_secs")]
    pub interval_secs: u64,
    /// Number of journeys to request per station board (default: 12)
    #[serde(default = "BoardSyncConfig::default_show_journeys")]
    pub show_journeys: u32,
}

impl Default for BoardSyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: Self::default_interval_secs(),
            show_journeys: Self::default_show_journeys(),
        }
    }
}

impl BoardSyncConfig {
    fn default_interval_secs() -> u64 {
        60
    }
    fn default_show_journeys() -> u32 {
        12
    }
}

impl Config {
    fn default_port() -> u16 {
        3000
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}
