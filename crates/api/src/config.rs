//! Service Configuration

use crate::rate_limit::RateLimitConfig;
use config::{Environment, File};
use forecast_engine::ForecastConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Feature table source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// CSV file loaded at startup
    pub path: PathBuf,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("probs_loc.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub table: TableConfig,
    pub forecast: ForecastConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
}

impl ServiceConfig {
    /// Load configuration from files and environment.
    ///
    /// Sources in increasing priority:
    /// 1. Built-in defaults
    /// 2. config/default.{toml,yaml,json}
    /// 3. config/{FORECAST_ENV}.{toml,yaml,json}
    /// 4. Environment variables, e.g. `FORECAST__TABLE__PATH`
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("FORECAST_ENV").unwrap_or_else(|_| "development".to_string());

        config::Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("FORECAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
