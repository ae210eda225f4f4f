//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub venue: VenueConfig,

    #[serde(default)]
    pub guest: GuestConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:10000".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    /// Base URL without a trailing slash
    pub fn normalized_base(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}

/// Live admin channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_live_path")]
    pub path: String,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,
}

fn default_live_path() -> String {
    "/ws/admin".to_string()
}

fn default_retry_delay() -> u64 {
    5000
}

fn default_heartbeat_interval() -> u64 {
    30000
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            path: default_live_path(),
            retry_delay_ms: default_retry_delay(),
            heartbeat_interval_ms: default_heartbeat_interval(),
        }
    }
}

impl LiveConfig {
    /// WebSocket URL derived from the backend base URL
    pub fn ws_url(&self, base_url: &str) -> String {
        let base = base_url
            .trim_end_matches('/')
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{}{}", base, self.path)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

/// Venue details shown on guest pages
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    #[serde(default = "default_venue_name")]
    pub name: String,

    #[serde(default = "default_venue_phone")]
    pub phone: String,

    #[serde(default)]
    pub map_url: Option<String>,

    #[serde(default = "default_schedule")]
    pub schedule: String,

    #[serde(default = "default_table_count")]
    pub table_count: u32,
}

fn default_venue_name() -> String {
    "Filin Lounge Bar".to_string()
}

fn default_venue_phone() -> String {
    "7-950-433-34-34".to_string()
}

fn default_schedule() -> String {
    "Daily 14:00 - 02:00".to_string()
}

fn default_table_count() -> u32 {
    8
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            name: default_venue_name(),
            phone: default_venue_phone(),
            map_url: None,
            schedule: default_schedule(),
            table_count: default_table_count(),
        }
    }
}

/// Guest-facing behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct GuestConfig {
    #[serde(default = "default_cancel_threshold")]
    pub cancel_threshold_hours: i64,

    #[serde(default = "default_notice_ttl")]
    pub notice_ttl_ms: u64,
}

fn default_cancel_threshold() -> i64 {
    2
}

fn default_notice_ttl() -> u64 {
    3000
}

impl Default for GuestConfig {
    fn default() -> Self {
        Self {
            cancel_threshold_hours: default_cancel_threshold(),
            notice_ttl_ms: default_notice_ttl(),
        }
    }
}

impl GuestConfig {
    pub fn cancel_threshold(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cancel_threshold_hours)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
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
            file: None,
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
            dirs::config_dir().map(|p| p.join("tablebook").join("config.toml")),
            Some(PathBuf::from("./tablebook.toml")),
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

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("TABLEBOOK_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Ok(timeout) = std::env::var("TABLEBOOK_REQUEST_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.backend.request_timeout_secs = t;
            }
        }

        if let Ok(path) = std::env::var("TABLEBOOK_LIVE_PATH") {
            self.live.path = path;
        }

        if let Ok(level) = std::env::var("TABLEBOOK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TABLEBOOK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Tablebook Configuration
#
# Environment variables override these settings:
# - TABLEBOOK_BACKEND_URL
# - TABLEBOOK_REQUEST_TIMEOUT_SECS
# - TABLEBOOK_LIVE_PATH
# - TABLEBOOK_LOG_LEVEL
# - TABLEBOOK_LOG_FORMAT

[backend]
# Booking backend base URL
base_url = "http://localhost:10000"

# Request timeout in seconds
request_timeout_secs = 15

[live]
# Admin live channel path (scheme is derived from base_url)
path = "/ws/admin"

# Delay before reconnecting after the channel closes (ms)
retry_delay_ms = 5000

# Heartbeat interval while connected (ms)
heartbeat_interval_ms = 30000

[venue]
name = "Filin Lounge Bar"
phone = "7-950-433-34-34"
schedule = "Daily 14:00 - 02:00"
# map_url = "https://2gis.ru/..."

# Number of tables shown in the admin grid
table_count = 8

[guest]
# Guests may cancel pending bookings more than this many hours ahead
cancel_threshold_hours = 2

# How long live notices stay on screen (ms)
notice_ttl_ms = 3000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/tablebook/tablebook.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.live.retry_delay_ms, 5000);
        assert_eq!(config.live.heartbeat_interval_ms, 30000);
        assert_eq!(config.venue.table_count, 8);
        assert_eq!(config.guest.cancel_threshold_hours, 2);
    }

    #[test]
    fn test_ws_url_from_base() {
        let live = LiveConfig::default();
        assert_eq!(live.ws_url("http://localhost:10000/"), "ws://localhost:10000/ws/admin");
        assert_eq!(live.ws_url("https://bar.example.com"), "wss://bar.example.com/ws/admin");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:10000");
        assert_eq!(config.live.path, "/ws/admin");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\nbase_url = \"http://10.0.0.5:8000\"\n[venue]\ntable_count = 12").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.backend.request_timeout_secs, 15);
        assert_eq!(config.venue.table_count, 12);
        assert_eq!(config.live.retry_delay_ms, 5000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/tablebook.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nbase_url = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
