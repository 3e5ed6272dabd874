//! Configuration file
//!
//! A JSON document; every key is optional:
//!
//! ```json
//! {
//!   "database": { "url": "sqlite://userbase.db", "max_connections": 5 },
//!   "http": { "host": "0.0.0.0", "port": 8000, "api_prefix": "" },
//!   "log_level": "info",
//!   "auto_migrate": true
//! }
//! ```
//!
//! `DATABASE_URL` and `USERBASE_PORT` override the file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::store::DatabaseConfig;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Apply pending migrations before serving (default true)
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_auto_migrate() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            http: HttpServerConfig::default(),
            log_level: default_log_level(),
            auto_migrate: default_auto_migrate(),
        }
    }
}

impl Config {
    /// Load, apply environment overrides, validate
    pub fn load(path: &Path) -> CliResult<Self> {
        Self::load_with(
            path,
            std::env::var("DATABASE_URL").ok(),
            std::env::var("USERBASE_PORT").ok(),
        )
    }

    fn load_with(
        path: &Path,
        database_url: Option<String>,
        port: Option<String>,
    ) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;
        config.apply_overrides(database_url, port)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    fn apply_overrides(
        &mut self,
        database_url: Option<String>,
        port: Option<String>,
    ) -> CliResult<()> {
        if let Some(url) = database_url {
            self.database.url = url;
        }
        if let Some(port) = port {
            self.http.port = port.parse().map_err(|_| {
                CliError::config_error(format!("Invalid USERBASE_PORT: '{}'", port))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(CliError::config_error("database.url must not be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(CliError::config_error("database.max_connections must be > 0"));
        }

        self.severity()?;

        let prefix = &self.http.api_prefix;
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            return Err(CliError::config_error(format!(
                "Invalid http.api_prefix: '{}'. Must start with '/' and not end with '/'.",
                prefix
            )));
        }

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(CliError::config_error)
    }
}
