//! Configuration Store
//!
//! Loading and saving the TOML config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{get_config_dir, CONFIG_FILE_NAME};
use crate::classifier::ClassifierMode;
use crate::error::{ItineraError, Result};
use crate::protocol::OutputFormat;

/// Unified Itinera configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Config file format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Where the itinerary server lives
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-session defaults
    #[serde(default)]
    pub session: SessionConfig,

    /// Debug log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<PathBuf> {
        let path = Self::default_path().ok_or_else(|| ItineraError::InvalidConfig {
            message: "could not determine a configuration directory".to_string(),
        })?;
        self.save(&path)?;
        Ok(path)
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        get_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let url = self.server.url.trim();
        let rest = url
            .strip_prefix("ws://")
            .or_else(|| url.strip_prefix("wss://"))
            .ok_or_else(|| ItineraError::InvalidConfig {
                message: format!("server.url must start with ws:// or wss:// (got '{}')", url),
            })?;
        if rest.is_empty() || rest.starts_with('/') {
            return Err(ItineraError::InvalidConfig {
                message: format!("server.url has no host (got '{}')", url),
            });
        }
        self.logging.level_filter()?;
        Ok(())
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Itinerary server endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// WebSocket URL of the planning endpoint
    #[serde(default = "default_server_url")]
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

fn default_server_url() -> String {
    "ws://127.0.0.1:5000/ws".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionConfig {
    /// Format requested from the server when none is given on the command line
    #[serde(default)]
    pub output_format: OutputFormat,

    /// How inbound messages are tagged
    #[serde(default)]
    pub classifier: ClassifierMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// off, error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file; defaults to the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse::<log::LevelFilter>()
            .map_err(|_| ItineraError::InvalidConfig {
                message: format!("logging.level '{}' is not a log level", self.level),
            })
    }

    /// Configured log file, or `<data_dir>/itinera/debug.log`
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("itinera").join("debug.log")))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
