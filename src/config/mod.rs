//! Configuration management for mongo-paginate
//!
//! This module handles loading, parsing, and validating configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::paginate::PageRequest;

/// Environment variable overriding `connection.uri`.
pub const ENV_URI: &str = "MONGO_PAGINATE_URI";

/// Environment variable overriding `connection.database`.
pub const ENV_DATABASE: &str = "MONGO_PAGINATE_DATABASE";

/// Environment variable overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "MONGO_PAGINATE_LOG_LEVEL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Pagination defaults
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Default MongoDB connection URI
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Default database name
    #[serde(default)]
    pub database: Option<String>,
}

/// Page size and time limit defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when none is requested
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    /// Largest page size accepted from the command line
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,

    /// Server-side time limit for each query, in seconds
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_limit() -> i64 {
    20
}

fn default_max_limit() -> i64 {
    1000
}

fn default_timeout_secs() -> u64 {
    45
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: None,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Load configuration from all sources with proper precedence
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and defaults otherwise. Environment overrides are
    /// applied last, then the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MONGO_PAGINATE_*` overrides through a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup(ENV_URI) {
            self.connection.uri = uri;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.connection.database = Some(database);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.parse()?;
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mongo-paginate")
            .join("config.toml")
    }

    /// Serialize the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let pagination = &self.pagination;
        if pagination.default_limit <= 0 {
            return Err(invalid("pagination.default_limit", pagination.default_limit));
        }
        if pagination.max_limit <= 0 {
            return Err(invalid("pagination.max_limit", pagination.max_limit));
        }
        if pagination.default_limit > pagination.max_limit {
            return Err(invalid("pagination.default_limit", pagination.default_limit));
        }
        if pagination.default_timeout_secs == 0 {
            return Err(invalid(
                "pagination.default_timeout_secs",
                pagination.default_timeout_secs,
            ));
        }
        if self.connection.uri.trim().is_empty() {
            return Err(invalid("connection.uri", "\"\""));
        }
        Ok(())
    }

    /// Get the per-query time limit as Duration
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.pagination.default_timeout_secs)
    }
}

fn invalid(field: &str, value: impl ToString) -> crate::error::PaginationError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl PaginationConfig {
    /// Page request carrying the configured limit and time limit
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.default_limit)
            .timeout(Duration::from_secs(self.default_timeout_secs))
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = crate::error::PaginationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(invalid("logging.level", s)),
        }
    }
}
