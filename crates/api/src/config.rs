//! Service configuration
//!
//! Defaults, overridden by an optional TOML file, overridden by `IMPACT__*`
//! environment variables (`IMPACT__SERVER__ADDR`, `IMPACT__INGESTION__SOURCE`, ...).

use config::{Config, ConfigError, Environment, File};
use ingestion::MockConfig;
use monitor::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Config file used when `IMPACT_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "impact-dashboard.toml";

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub monitor: MonitorConfig,
    pub ingestion: IngestionConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where readings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Built-in synthetic generator
    #[default]
    Mock,
    /// Device pushes to `POST /api/v1/readings`
    Push,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub source: SourceKind,
    pub mock: MockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of plain text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus scrape endpoint; disabled when absent
    pub listen: Option<SocketAddr>,
}

impl AppConfig {
    /// Load from `$IMPACT_CONFIG` (or the default file) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("IMPACT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load from `path` and the environment; a missing file is not an error
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("IMPACT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
