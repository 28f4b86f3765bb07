//! Settings file support.
//!
//! The settings blob is owned by the view layer; the engine only reads
//! `last_color_scheme` at startup and writes it back when the scheme changes.
//! Unknown or missing keys fall back to defaults so older files keep loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GRID_COLUMNS, DEFAULT_SCHEME_DIR, NO_SCHEME};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current settings file format version.
/// Increment this when making breaking changes to the settings format.
pub const SETTINGS_VERSION: u32 = 1;

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Version of the settings file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Folder opened in the previous session
    #[serde(default)]
    pub last_opened_folder: Option<String>,

    /// Color scheme selected in the previous session
    #[serde(default = "default_scheme")]
    pub last_color_scheme: String,

    /// Dark theme enabled
    #[serde(default, alias = "dark_mode")]
    pub dark_mode_enabled: bool,

    /// Directory scanned for color schemes
    #[serde(default = "default_scheme_dir")]
    pub scheme_dir: String,

    /// Number of columns in the thumbnail grid
    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_scheme() -> String {
    NO_SCHEME.to_string()
}

fn default_scheme_dir() -> String {
    DEFAULT_SCHEME_DIR.to_string()
}

fn default_columns() -> usize {
    DEFAULT_GRID_COLUMNS
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl AppSettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self {
            version: SETTINGS_VERSION,
            last_opened_folder: None,
            last_color_scheme: default_scheme(),
            dark_mode_enabled: false,
            scheme_dir: default_scheme_dir(),
            columns: default_columns(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the settings to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if settings.version > SETTINGS_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: settings.version,
                supported_version: SETTINGS_VERSION,
            });
        }

        Ok(settings)
    }

    /// Get the default filename for the settings file.
    pub fn default_filename() -> &'static str {
        "captag-settings.json"
    }

    /// Get the default settings path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("captag").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("captag")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load settings from `path`.
    ///
    /// Returns None if the file doesn't exist or can't be parsed.
    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No settings file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {:?}", path);
                    Some(settings)
                }
                Err(e) => {
                    log::warn!("Failed to parse settings file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read settings file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save settings to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur when loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Settings version is newer than supported
    #[error(
        "Settings file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        /// Version found in the file
        file_version: u32,
        /// Newest version this build understands
        supported_version: u32,
    },

    /// I/O error when reading/writing settings
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.last_color_scheme, NO_SCHEME);
        assert_eq!(settings.columns, DEFAULT_GRID_COLUMNS);
        assert!(!settings.dark_mode_enabled);
        assert!(settings.last_opened_folder.is_none());
    }

    #[test]
    fn test_partial_blob_fills_defaults() {
        let settings = AppSettings::from_json(
            r#"{"last_opened_folder": "/pics", "last_color_scheme": "danbooru", "dark_mode": true}"#,
        )
        .unwrap();
        assert_eq!(settings.last_opened_folder.as_deref(), Some("/pics"));
        assert_eq!(settings.last_color_scheme, "danbooru");
        assert!(settings.dark_mode_enabled);
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.log_level, LogLevel::Info);
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = format!(r#"{{"version": {}}}"#, SETTINGS_VERSION + 1);
        assert!(matches!(
            AppSettings::from_json(&json),
            Err(ConfigError::VersionTooNew { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::new();
        settings.last_color_scheme = "e621".to_string();
        settings.log_level = LogLevel::Debug;
        settings.save_to(&path).unwrap();

        assert_eq!(AppSettings::load_from(&path), Some(settings));
    }

    #[test]
    fn test_load_missing_or_corrupt_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(AppSettings::load_from(&dir.path().join("missing.json")).is_none());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        assert!(AppSettings::load_from(&corrupt).is_none());
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
    }
}
