//! Sluice configuration system
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Environment variables (SLUICE_LOG)
//! 3. User-level (~/.config/sluice/config.toml)
//! 4. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use sluice::util::config::load_user_config;
//!
//! let config = load_user_config().unwrap_or_default();
//! println!("{}", config.repl.prompt);
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::logger::LogLevel;

/// Environment variable overriding the configured log level
pub const LOG_ENV_VAR: &str = "SLUICE_LOG";

/// User-level configuration for Sluice
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct UserConfig {
    /// REPL settings
    #[serde(default)]
    pub repl: ReplConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
    /// Program execution settings
    #[serde(default)]
    pub run: RunConfig,
}

/// REPL configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReplConfig {
    /// Prompt string
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// History file path
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    /// History size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_history_size() -> usize {
    1000
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            history_file: None,
            history_size: default_history_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Execution configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RunConfig {
    /// Run programs directly against the prelude instead of a copy of it
    #[serde(default)]
    pub alias_env: bool,
}

impl UserConfig {
    /// Effective log level: environment variable first, then the file
    pub fn log_level(&self) -> LogLevel {
        std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
            .or_else(|| self.log.level.parse().ok())
            .unwrap_or(LogLevel::Warn)
    }
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    // Try XDG config directory on Unix
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("sluice"));
    }

    // Fallback to ~/.config/sluice
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("sluice"));
    }

    // On Windows, try %APPDATA%
    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("sluice"));
    }

    None
}

/// Get the user config file path (~/.config/sluice/config.toml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    match get_config_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Ok(UserConfig::default()),
    }
}

/// Load configuration from an explicit path
pub fn load_config_from(path: &Path) -> Result<UserConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
