//! Configuration management for Keyboard Latency
//!
//! Settings are read from a platform-specific TOML file. A missing file
//! means defaults; every section and field may be omitted.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keyboard-latency/config.toml` |
//! | macOS | `~/Library/Application Support/keyboard-latency/config.toml` |
//! | Windows | `%APPDATA%\keyboard-latency\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keyboard_latency::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.capture.suppress = false;
//! config.save().expect("Failed to save config");
//! ```

use crate::keyboard::LayoutId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const APP_DIR: &str = "keyboard-latency";

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join(APP_DIR);

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Hook and event queue settings
    pub capture: CaptureConfig,
    /// UI settings
    pub ui: UiConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Hook and event queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Try to install the OS keyboard hook
    pub hook: bool,
    /// Keep layout keys from reaching the system while the hook is active
    pub suppress: bool,
    /// How long to wait for a hook installation failure before assuming success
    pub startup_probe_ms: u64,
    /// Maximum events applied per UI wake-up
    pub batch_size: usize,
    /// Queued events kept before the oldest are dropped (0 = no limit)
    pub max_backlog: usize,
    /// Bound on waiting for the capture thread at exit
    pub shutdown_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            hook: true,
            suppress: true,
            startup_probe_ms: 250,
            batch_size: 256,
            max_backlog: 65_536,
            shutdown_timeout_ms: 500,
        }
    }
}

impl CaptureConfig {
    pub fn startup_probe(&self) -> Duration {
        Duration::from_millis(self.startup_probe_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Wake-up period of the update loop in milliseconds
    pub tick_ms: u64,
    /// Layout shown at startup
    pub layout: LayoutId,
    /// Color theme (dark/light)
    pub theme: Theme,
    /// How long status messages stay visible
    pub status_duration_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            layout: LayoutId::Qwerty,
            theme: Theme::Dark,
            status_duration_secs: 3,
        }
    }
}

/// Color theme options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`error`, `warn`, `info`, `debug`, `trace`, or env_logger syntax)
    pub level: String,
    /// Log file; defaults to the platform cache directory
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Configured log file, or `<cache_dir>/keyboard-latency/keyboard-latency.log`
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(|| {
            dirs::cache_dir().map(|dir| dir.join(APP_DIR).join("keyboard-latency.log"))
        })
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Update loop wake-up period, never shorter than 1 ms
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.ui.tick_ms.max(1))
    }

    pub fn status_duration(&self) -> Duration {
        Duration::from_secs(self.ui.status_duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_config_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("keyboard-latency-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert!(config.capture.hook);
        assert!(config.capture.suppress);
        assert_eq!(config.capture.startup_probe_ms, 250);
        assert_eq!(config.capture.batch_size, 256);
        assert_eq!(config.capture.max_backlog, 65_536);
        assert_eq!(config.capture.shutdown_timeout_ms, 500);
        assert_eq!(config.ui.tick_ms, 10);
        assert_eq!(config.ui.layout, LayoutId::Qwerty);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn config_tick_interval() {
        let mut config = Config::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
        config.ui.tick_ms = 0;
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn config_save_and_load_roundtrip() {
        let path = temp_config_path("roundtrip");

        let mut config = Config::default();
        config.capture.suppress = false;
        config.ui.layout = LayoutId::Azerty;
        config.ui.theme = Theme::Light;

        config.save_to(&path).expect("Failed to save config");
        let loaded = Config::load_from(&path).expect("Failed to load config");

        assert!(!loaded.capture.suppress);
        assert_eq!(loaded.ui.layout, LayoutId::Azerty);
        assert_eq!(loaded.ui.theme, Theme::Light);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_load_missing_file_is_io_error() {
        let result = Config::load_from(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn config_load_garbage_is_parse_error() {
        let path = temp_config_path("garbage");
        fs::write(&path, "capture = [not toml").unwrap();
        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let toml_str = r#"
[capture]
suppress = false

[ui]
layout = "azerty"
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert!(!config.capture.suppress);
        assert!(config.capture.hook);
        assert_eq!(config.capture.batch_size, 256);
        assert_eq!(config.ui.layout, LayoutId::Azerty);
        assert_eq!(config.ui.tick_ms, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn config_serializes_to_toml() {
        let toml_str = toml::to_string_pretty(&Config::default()).expect("Failed to serialize");
        assert!(toml_str.contains("[capture]"));
        assert!(toml_str.contains("[ui]"));
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("layout = \"qwerty\""));
        assert!(toml_str.contains("theme = \"Dark\""));
    }

    #[test]
    fn config_error_display() {
        assert_eq!(ConfigError::NoConfigDir.to_string(), "Could not determine config directory");
        let io_err = ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(io_err.to_string().contains("IO error"));
    }

    #[test]
    fn explicit_log_file_wins() {
        let logging = LoggingConfig {
            file: Some(PathBuf::from("/tmp/kl.log")),
            ..LoggingConfig::default()
        };
        assert_eq!(logging.file_path(), Some(PathBuf::from("/tmp/kl.log")));
    }
}
