//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::{TriggerBasis, WindowPreset};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where event data lives
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    /// JSON event log(s) loaded into the API at startup
    pub events_file: Option<String>,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Base URL clients use to reach the server
    pub fn base_url(&self) -> String {
        let host = if self.host == "0.0.0.0" {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };
        format!("http://{}:{}", host, self.port)
    }
}

/// Report and analysis defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub default_window: WindowPreset,

    /// Length of the longest bar in text reports
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,

    #[serde(default)]
    pub trigger_basis: TriggerBasis,
}

fn default_bar_width() -> usize {
    30
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_window: WindowPreset::default(),
            bar_width: default_bar_width(),
            trigger_basis: TriggerBasis::default(),
        }
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

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
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
            dirs::config_dir().map(|p| p.join("pawtrack").join("config.toml")),
            Some(PathBuf::from("./pawtrack.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(events_file) = std::env::var("PAWTRACK_EVENTS_FILE") {
            self.data.events_file = Some(events_file);
        }

        // API overrides
        if let Ok(host) = std::env::var("PAWTRACK_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("PAWTRACK_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Ok(window) = std::env::var("PAWTRACK_REPORT_WINDOW") {
            match window.parse() {
                Ok(preset) => self.report.default_window = preset,
                Err(e) => tracing::warn!("Ignoring PAWTRACK_REPORT_WINDOW: {}", e),
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("PAWTRACK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PAWTRACK_LOG_FORMAT") {
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
    r#"# Pawtrack Configuration
#
# Environment variables override these settings:
# - PAWTRACK_EVENTS_FILE
# - PAWTRACK_API_HOST
# - PAWTRACK_API_PORT
# - PAWTRACK_REPORT_WINDOW
# - PAWTRACK_LOG_LEVEL
# - PAWTRACK_LOG_FORMAT

[data]
# JSON event log loaded by the API server at startup
# events_file = "~/pawtrack/rex.json"

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[report]
# Default analysis window: 7d, 30d or 90d
default_window = "30d"

# Width of the longest bar in text reports
bar_width = 30

# Which records count as trigger occurrences:
# trigger_log, symptom_tags or combined
trigger_basis = "combined"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/pawtrack/pawtrack.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.api.port, 8090);
        assert_eq!(config.report.default_window, WindowPreset::Last30Days);
        assert_eq!(config.report.trigger_basis, TriggerBasis::Combined);
        assert_eq!(config.report.bar_width, 30);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.data.events_file.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [report]
            default_window = "7d"
            trigger_basis = "symptom_tags"
            "#,
        )
        .unwrap();

        assert_eq!(config.report.default_window, WindowPreset::Last7Days);
        assert_eq!(config.report.trigger_basis, TriggerBasis::SymptomTags);
        assert_eq!(config.report.bar_width, 30);
        assert_eq!(config.api.host, "127.0.0.1");
    }

    #[test]
    fn test_api_section_keeps_default_cors_origins() {
        let config = Config::parse("[api]\nport = 9000").unwrap();

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.cors_origins, ApiConfig::default().cors_origins);
        assert!(!config.api.cors_origins.is_empty());

        let config = Config::parse("[api]\ncors_origins = []").unwrap();
        assert!(config.api.cors_origins.is_empty());
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let err = Config::parse("[report]\ndefault_window = \"14d\"").unwrap_err();
        assert!(err.contains("14d"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = 9999").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.port, 9999);

        let err = Config::load(Path::new("/nonexistent/pawtrack.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_base_url() {
        let mut api = ApiConfig::default();
        assert_eq!(api.base_url(), "http://127.0.0.1:8090");
        api.host = "0.0.0.0".to_string();
        assert_eq!(api.base_url(), "http://127.0.0.1:8090");
    }
}
