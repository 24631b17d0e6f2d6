//! Configuration management for the MedStock pharmacy server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MEDSTOCK_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::forecast::{ForecastModel, ReorderPolicy};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Log output configuration
    pub logging: LoggingConfig,

    /// Alerting thresholds
    pub alerts: AlertConfig,

    /// Forecast tables and tunables; missing keys keep the built-in values
    #[serde(default)]
    pub forecast: ForecastModel,

    /// Reorder recommendation policy
    #[serde(default)]
    pub reorder: ReorderPolicy,

    /// Request limits for the forecast endpoint
    pub forecast_limits: ForecastLimits,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Load the sample catalogue into an empty database on startup
    pub seed_sample_data: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable logs
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertConfig {
    /// Days ahead counted as "expiring soon" on the dashboard
    pub expiry_window_days: i64,

    /// Extra units added on top of the shortage when bulk-queueing low stock
    pub low_stock_buffer: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastLimits {
    /// Longest forecast horizon accepted, in months
    pub max_horizon_months: u32,

    /// Horizon used when the request does not specify one
    pub default_horizon_months: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("MEDSTOCK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let server = ServerConfig::default();
        let alerts = AlertConfig::default();
        let limits = ForecastLimits::default();

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", i64::from(server.port))?
            .set_default("server.host", server.host)?
            .set_default("database.url", "sqlite://pharmacy.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("database.seed_sample_data", false)?
            .set_default("logging.json", false)?
            .set_default("alerts.expiry_window_days", alerts.expiry_window_days)?
            .set_default("alerts.low_stock_buffer", alerts.low_stock_buffer)?
            .set_default(
                "forecast_limits.max_horizon_months",
                i64::from(limits.max_horizon_months),
            )?
            .set_default(
                "forecast_limits.default_horizon_months",
                i64::from(limits.default_horizon_months),
            )?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MEDSTOCK_ prefix)
            .add_source(
                Environment::with_prefix("MEDSTOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            expiry_window_days: 30,
            low_stock_buffer: 20,
        }
    }
}

impl Default for ForecastLimits {
    fn default() -> Self {
        Self {
            max_horizon_months: 24,
            default_horizon_months: 3,
        }
    }
}
