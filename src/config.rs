//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::panel::Team;
use crate::poller::{DEFAULT_LAST_N, DEFAULT_REFRESH_INTERVAL};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sth: SthConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// History API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SthConfig {
    /// Endpoint answering `?attr=<name>&lastN=<n>`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Samples requested per poll
    #[serde(default = "default_last_n")]
    pub last_n: usize,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:3000/api/sth".to_string()
}

fn default_last_n() -> usize {
    DEFAULT_LAST_N
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL.as_millis() as u64
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for SthConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            last_n: default_last_n(),
            refresh_interval_ms: default_refresh_interval(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl SthConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Dashboard server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Attributes to mount a panel for, in page order
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_attributes() -> Vec<String> {
    vec!["gb".to_string(), "gr".to_string()]
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            attributes: default_attributes(),
        }
    }
}

impl DashboardConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("placar").join("config.toml")),
            Some(PathBuf::from("/etc/placar/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the process environment in production)
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // History API overrides
        if let Some(endpoint) = lookup("PLACAR_STH_ENDPOINT") {
            self.sth.endpoint = endpoint;
        }
        if let Some(n) = lookup("PLACAR_LAST_N").and_then(|s| s.parse().ok()) {
            self.sth.last_n = n;
        }
        if let Some(ms) = lookup("PLACAR_REFRESH_MS").and_then(|s| s.parse().ok()) {
            self.sth.refresh_interval_ms = ms;
        }

        // Dashboard overrides
        if let Some(host) = lookup("PLACAR_HOST") {
            self.dashboard.host = host;
        }
        if let Some(port) = lookup("PLACAR_PORT").and_then(|s| s.parse().ok()) {
            self.dashboard.port = port;
        }
        if let Some(attrs) = lookup("PLACAR_ATTRIBUTES") {
            self.dashboard.attributes = attrs
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
        }

        // Logging overrides
        if let Some(level) = lookup("PLACAR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PLACAR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Check values that would make the dashboard unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sth.last_n == 0 {
            return Err(ConfigError::Invalid("sth.last_n must be at least 1".to_string()));
        }
        if self.sth.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "sth.refresh_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.dashboard.attributes.is_empty() {
            return Err(ConfigError::Invalid(
                "dashboard.attributes must name at least one attribute".to_string(),
            ));
        }
        for attr in &self.dashboard.attributes {
            Team::from_attribute(attr).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Placar Configuration
#
# Environment variables override these settings:
# - PLACAR_STH_ENDPOINT
# - PLACAR_LAST_N
# - PLACAR_REFRESH_MS
# - PLACAR_HOST
# - PLACAR_PORT
# - PLACAR_ATTRIBUTES (comma separated)
# - PLACAR_LOG_LEVEL
# - PLACAR_LOG_FORMAT

[sth]
# History endpoint, queried as <endpoint>?attr=<name>&lastN=<n>
endpoint = "http://localhost:3000/api/sth"

# Samples requested per poll
last_n = 20

# How often each panel polls (ms)
refresh_interval_ms = 5000

# Per-request timeout (ms)
request_timeout_ms = 10000

[dashboard]
# Dashboard server host
host = "0.0.0.0"

# Dashboard server port
port = 8090

# One panel per attribute: "gb" (blue team) and/or "gr" (red team)
attributes = ["gb", "gr"]

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
