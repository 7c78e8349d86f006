//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "eventLog": true, ... },
//!   "storage": { "file": "lockbox.duckdb" }
//! }
//! ```
//! Keys this library does not manage are preserved on save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default name of the key-value database file
pub const DEFAULT_STORE_FILE: &str = "lockbox.duckdb";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    storage: StorageSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default = "default_true")]
    event_log: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            event_log: true,
            other: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageSettings {
    #[serde(default = "default_store_file")]
    file: String,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            file: default_store_file(),
            other: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_store_file() -> String {
    DEFAULT_STORE_FILE.to_string()
}

/// Resolve the data directory
///
/// `LOCKBOX_DIR` wins; otherwise the platform data directory (falling back
/// to the home directory) with a `lockbox` subfolder.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LOCKBOX_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lockbox")
}

/// Lockbox configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Record auth events in logs.duckdb
    pub event_log: bool,
    /// File name of the key-value database inside the data directory
    pub store_file: String,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_log: true,
            store_file: default_store_file(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The event log can also be switched with the LOCKBOX_EVENT_LOG
    /// environment variable, which beats the settings file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let event_log = match std::env::var("LOCKBOX_EVENT_LOG").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.event_log,
        };

        Ok(Self {
            event_log,
            store_file: raw.storage.file.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that this library doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        // Load existing settings to preserve fields we don't manage
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.app.event_log = self.event_log;
        settings.storage.file = self.store_file.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {:?}", settings_path))?;
        Ok(())
    }

    /// Full path of the key-value database
    pub fn store_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.store_file)
    }
}
