//! Configuration management
//!
//! All configuration types are exported from this module.

pub mod store;

pub use store::{Config, LoggingConfig, ServerConfig, SessionConfig};

use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "itinera.toml";

/// Find the configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(dir) = get_config_dir() {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Get the configuration directory path
pub fn get_config_dir() -> Option<PathBuf> {
    use dirs::config_dir;
    use home::home_dir;

    if let Some(dir) = config_dir() {
        return Some(dir.join("itinera"));
    }

    if let Some(home) = home_dir() {
        return Some(home.join(".config").join("itinera"));
    }

    None
}
