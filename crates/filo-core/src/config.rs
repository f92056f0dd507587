//! Application configuration
//!
//! Centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ledger: LedgerConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_timeout() -> u64 {
    30
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Ledger-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Spends allowed per vehicle per service type per calendar day
    #[serde(default = "default_daily_spend_limit")]
    pub daily_spend_limit: i64,

    /// Page size cap for ledger and transaction listings
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

fn default_daily_spend_limit() -> i64 {
    1
}

fn default_max_page_size() -> i64 {
    1000
}

impl AppConfig {
    /// Load configuration from environment and optional config file.
    ///
    /// Sources, later ones winning: built-in defaults, `config/default` and
    /// `config/{RUN_MODE}` files, `FILO_`-prefixed environment variables,
    /// and finally the conventional `DATABASE_URL` for the database URL.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.timeout_secs", 30)?
            .set_default("database.url", "postgresql://localhost/filo_ledger")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("ledger.daily_spend_limit", 1)?
            .set_default("ledger.max_page_size", 1000)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with FILO_ prefix
            .add_source(
                Environment::with_prefix("FILO")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            daily_spend_limit: 1,
            max_page_size: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ledger_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.daily_spend_limit, 1);
        assert_eq!(config.max_page_size, 1000);
    }

    #[test]
    fn test_load_defaults() {
        let config = AppConfig::load().expect("defaults must load");
        assert_eq!(config.ledger.daily_spend_limit, 1);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.database.url.is_empty());
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9040,
            workers: 4,
            timeout_secs: 30,
        };
        let config = AppConfig {
            server: config,
            database: DatabaseConfig {
                url: "postgresql://localhost/filo_ledger".to_string(),
                max_connections: 10,
                min_connections: 2,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
            },
            ledger: LedgerConfig::default(),
        };
        assert_eq!(config.server_addr(), "127.0.0.1:9040");
    }
}
