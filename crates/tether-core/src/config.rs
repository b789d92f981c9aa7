//! Configuration types for tether
//!
//! Platform-chosen defaults for bindings (idle threshold, clipboard
//! revert delay, debounce delay), the storage backend, and fetch client
//! settings. Every field has a default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::traits::EventKind;

/// Main tether configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TetherConfig {
    /// Idle binding defaults
    #[serde(default)]
    pub idle: IdleConfig,

    /// Clipboard binding defaults
    #[serde(default)]
    pub clipboard: ClipboardConfig,

    /// Value-debounce binding defaults
    #[serde(default)]
    pub debounce: DebounceConfig,

    /// Local storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP client settings for fetch bindings
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl TetherConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let config: TetherConfig = serde_json::from_str(json)
            .map_err(|e| crate::Error::config(format!("Invalid configuration JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.idle.validate()?;
        self.clipboard.validate()?;
        self.debounce.validate()?;
        self.storage.validate()?;
        self.fetch.validate()?;
        Ok(())
    }
}

/// Idle binding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Inactivity threshold before the idle binding reports idle
    #[serde(default = "default_idle_time_ms")]
    pub idle_time_ms: u64,

    /// Activity signals that reset the countdown
    #[serde(default = "default_activity_events")]
    pub events: Vec<EventKind>,
}

impl IdleConfig {
    /// Threshold as a duration
    pub fn idle_time(&self) -> Duration {
        Duration::from_millis(self.idle_time_ms)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.idle_time_ms == 0 {
            return Err(crate::Error::config("Idle threshold must be > 0"));
        }
        if self.events.is_empty() {
            return Err(crate::Error::config(
                "Idle binding needs at least one activity event",
            ));
        }
        Ok(())
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            idle_time_ms: default_idle_time_ms(),
            events: default_activity_events(),
        }
    }
}

/// Clipboard binding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Delay after a successful copy before "copied" reverts to false
    #[serde(default = "default_clipboard_reset_ms")]
    pub reset_after_ms: u64,
}

impl ClipboardConfig {
    /// Revert delay as a duration
    pub fn reset_after(&self) -> Duration {
        Duration::from_millis(self.reset_after_ms)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.reset_after_ms == 0 {
            return Err(crate::Error::config("Clipboard reset delay must be > 0"));
        }
        Ok(())
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            reset_after_ms: default_clipboard_reset_ms(),
        }
    }
}

/// Value-debounce binding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Default stability window
    #[serde(default = "default_debounce_delay_ms")]
    pub delay_ms: u64,
}

impl DebounceConfig {
    /// Delay as a duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.delay_ms == 0 {
            return Err(crate::Error::config("Debounce delay must be > 0"));
        }
        Ok(())
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_debounce_delay_ms(),
        }
    }
}

/// Local storage backend configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// In-memory storage (not persistent)
    #[default]
    Memory,

    /// JSON file storage
    File {
        /// Path to the storage file
        path: String,
    },

    /// No storage backend (non-interactive context)
    Disabled,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StorageConfig::File { path } if path.trim().is_empty() => Err(
                crate::Error::config("File storage path cannot be empty"),
            ),
            _ => Ok(()),
        }
    }

    /// Get the backend type name
    pub fn type_name(&self) -> &str {
        match self {
            StorageConfig::Memory => "memory",
            StorageConfig::File { .. } => "file",
            StorageConfig::Disabled => "disabled",
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl FetchConfig {
    /// Timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Fetch timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_idle_time_ms() -> u64 {
    300_000
}

fn default_activity_events() -> Vec<EventKind> {
    vec![
        EventKind::MouseDown,
        EventKind::MouseMove,
        EventKind::TouchStart,
        EventKind::TouchMove,
        EventKind::KeyDown,
        EventKind::Wheel,
    ]
}

fn default_clipboard_reset_ms() -> u64 {
    2000
}

fn default_debounce_delay_ms() -> u64 {
    500
}

fn default_fetch_timeout_secs() -> u64 {
    10
}
