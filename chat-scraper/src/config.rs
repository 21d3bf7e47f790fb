//! Configuration management for the chat scraper.
//!
//! Loads configuration from a TOML file and provides runtime defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Why a config file could not be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No config file found at {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Name of the chat application to automate
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

/// Settle delays between automation steps, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Wait after launching the app before touching its UI
    #[serde(default = "default_launch_settle")]
    pub launch_settle_ms: u64,

    /// Wait for the search field to appear after the search shortcut
    #[serde(default = "default_search_focus")]
    pub search_focus_ms: u64,

    /// Wait after clearing the search field
    #[serde(default = "default_search_clear")]
    pub search_clear_ms: u64,

    /// Wait for search results after typing
    #[serde(default = "default_search_results")]
    pub search_results_ms: u64,

    /// Wait for the chat to load after selecting a result
    #[serde(default = "default_chat_load")]
    pub chat_load_ms: u64,

    /// Wait after each scroll action
    #[serde(default = "default_scroll_settle")]
    pub scroll_settle_ms: u64,

    /// Wait after the last scroll before extracting text
    #[serde(default = "default_extract_settle")]
    pub extract_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            launch_settle_ms: default_launch_settle(),
            search_focus_ms: default_search_focus(),
            search_clear_ms: default_search_clear(),
            search_results_ms: default_search_results(),
            chat_load_ms: default_chat_load(),
            scroll_settle_ms: default_scroll_settle(),
            extract_settle_ms: default_extract_settle(),
        }
    }
}

impl TimingConfig {
    /// Disable every settle delay. Used by tests and offline dry runs.
    pub fn zero() -> Self {
        Self {
            launch_settle_ms: 0,
            search_focus_ms: 0,
            search_clear_ms: 0,
            search_results_ms: 0,
            chat_load_ms: 0,
            scroll_settle_ms: 0,
            extract_settle_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Traversal depth for whole-window chat extraction
    #[serde(default = "default_chat_max_depth")]
    pub chat_max_depth: u32,

    /// Traversal depth for sidebar extraction
    #[serde(default = "default_sidebar_max_depth")]
    pub sidebar_max_depth: u32,

    /// Subtree holding the contact list
    #[serde(default = "default_sidebar_subtree")]
    pub sidebar_subtree: String,

    /// Scroll distance per action on the chat container
    #[serde(default = "default_scroll_amount")]
    pub scroll_amount: u32,

    /// Assumed messages visible per viewport
    #[serde(default = "default_messages_per_viewport")]
    pub messages_per_viewport: usize,

    /// Message count used when a request does not give one
    #[serde(default = "default_message_count")]
    pub default_message_count: usize,

    /// Accessibility role of the contact search field
    #[serde(default = "default_search_field_role")]
    pub search_field_role: String,

    /// Accessibility role of the chat message container
    #[serde(default = "default_scroll_area_role")]
    pub scroll_area_role: String,

    /// Keyboard shortcut that focuses search when the field is not found
    #[serde(default = "default_search_shortcut")]
    pub search_shortcut: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            chat_max_depth: default_chat_max_depth(),
            sidebar_max_depth: default_sidebar_max_depth(),
            sidebar_subtree: default_sidebar_subtree(),
            scroll_amount: default_scroll_amount(),
            messages_per_viewport: default_messages_per_viewport(),
            default_message_count: default_message_count(),
            search_field_role: default_search_field_role(),
            scroll_area_role: default_scroll_area_role(),
            search_shortcut: default_search_shortcut(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Path to the automation helper binary
    #[serde(default)]
    pub binary_path: Option<String>,

    /// Arguments placed before every sub-command (e.g. a script for an interpreter)
    #[serde(default)]
    pub binary_args: Vec<String>,

    /// Timeout for a single automation command
    #[serde(default = "default_driver_timeout")]
    pub timeout_secs: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            binary_args: Vec::new(),
            timeout_secs: default_driver_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Unix socket the request service listens on
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }
}

// Default value functions for serde
fn default_app_name() -> String {
    "WhatsApp".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_launch_settle() -> u64 {
    2000
}

fn default_search_focus() -> u64 {
    500
}

fn default_search_clear() -> u64 {
    300
}

fn default_search_results() -> u64 {
    1000
}

fn default_chat_load() -> u64 {
    1000
}

fn default_scroll_settle() -> u64 {
    300
}

fn default_extract_settle() -> u64 {
    1000
}

fn default_chat_max_depth() -> u32 {
    100
}

fn default_sidebar_max_depth() -> u32 {
    50
}

fn default_sidebar_subtree() -> String {
    "sidebar".to_string()
}

fn default_scroll_amount() -> u32 {
    500
}

fn default_messages_per_viewport() -> usize {
    chat_transcript::MESSAGES_PER_VIEWPORT
}

fn default_message_count() -> usize {
    50
}

fn default_search_field_role() -> String {
    "AXTextField".to_string()
}

fn default_scroll_area_role() -> String {
    "AXScrollArea".to_string()
}

fn default_search_shortcut() -> String {
    if cfg!(target_os = "macos") {
        "command+f".to_string()
    } else {
        "ctrl+f".to_string()
    }
}

fn default_driver_timeout() -> u64 {
    30
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/chat-scraper.sock")
}

/// Convert a millisecond setting into a `Duration`
pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

impl Config {
    /// Load configuration from a specific path, falling back to defaults
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        Self::or_defaults(Self::read_from_path(path))
    }

    /// Read and parse a config file without falling back to defaults
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Log the outcome of [`read_from_path`](Self::read_from_path) and fall
    /// back to defaults on failure. Call after logging is initialised.
    pub fn or_defaults(loaded: Result<Self, ConfigError>) -> Self {
        match loaded {
            Ok(config) => {
                info!("Configuration loaded");
                config
            }
            Err(e @ ConfigError::NotFound(_)) => {
                info!("{}, using defaults", e);
                Self::default()
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chat-scraper")
            .join("config.toml")
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, contents)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.app_name, "WhatsApp");
        assert_eq!(config.timing.launch_settle_ms, 2000);
        assert_eq!(config.timing.scroll_settle_ms, 300);
        assert_eq!(config.extraction.chat_max_depth, 100);
        assert_eq!(config.extraction.sidebar_max_depth, 50);
        assert_eq!(config.extraction.messages_per_viewport, 15);
        assert_eq!(config.extraction.default_message_count, 50);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[general]
app_name = "Signal"
log_level = "debug"

[timing]
scroll_settle_ms = 50

[extraction]
messages_per_viewport = 20
search_shortcut = "command+k"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.app_name, "Signal");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.timing.scroll_settle_ms, 50);
        assert_eq!(config.timing.launch_settle_ms, 2000);
        assert_eq!(config.extraction.messages_per_viewport, 20);
        assert_eq!(config.extraction.search_shortcut, "command+k");
        assert_eq!(config.driver.timeout_secs, 30);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.general.app_name = "Telegram".to_string();
        config.driver.binary_path = Some("/opt/bin/ax-operator".to_string());
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path);
        assert_eq!(loaded.general.app_name, "Telegram");
        assert_eq!(loaded.driver.binary_path.as_deref(), Some("/opt/bin/ax-operator"));
    }

    #[test]
    fn test_missing_or_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Config::load_from_path(dir.path().join("absent.toml"));
        assert_eq!(missing.general.app_name, "WhatsApp");

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[general\napp_name = ").unwrap();
        assert_eq!(Config::load_from_path(&bad).timing.chat_load_ms, 1000);
    }

    #[test]
    fn test_read_reports_why_file_was_unusable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::read_from_path(dir.path().join("absent.toml")),
            Err(ConfigError::NotFound(_))
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[general\napp_name = ").unwrap();
        let err = Config::read_from_path(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_zero_timing() {
        let timing = TimingConfig::zero();
        assert_eq!(timing.launch_settle_ms, 0);
        assert_eq!(millis(timing.extract_settle_ms), Duration::ZERO);
    }
}
