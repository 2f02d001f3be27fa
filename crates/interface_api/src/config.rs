//! API configuration
//!
//! Read from `API_*` environment variables (a `.env` file is loaded first by
//! the server binary). Every setting has a default.

use serde::Deserialize;

/// Where ledger data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    /// Process memory, lost on exit
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// `EnvFilter` directive, e.g. `info` or `domain_ledger=debug,info`
    pub log_level: String,
    pub log_format: LogFormat,
    pub storage: StorageBackend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/ledger".to_string(),
            max_connections: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            storage: StorageBackend::Postgres,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` variables over the defaults
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", defaults.database_url)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .set_default("storage", "postgres")
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
