//! Configuration management.
//!
//! Loads settings from `$LETTERLAB_CONFIG` or the user config directory
//! (`~/.config/letterlab/config.toml`), falling back to defaults.

use crate::kv::DbLocation;
use crate::report::DEFAULT_WEAKEST_PAIRS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "LETTERLAB_CONFIG";

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database path; unset means the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn location(&self) -> DbLocation {
        match &self.path {
            Some(path) => DbLocation::Custom(path.clone()),
            None => DbLocation::User,
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Weakest confusion pairs listed in a report
    #[serde(default = "default_weakest_pairs")]
    pub weakest_pairs: usize,
}

fn default_weakest_pairs() -> usize {
    DEFAULT_WEAKEST_PAIRS
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            weakest_pairs: default_weakest_pairs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the active config came from.
///
/// Loading runs before the log subscriber exists, so the outcome is kept
/// here and reported with [`ConfigSource::log`] once logging is up.
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file at the search path
    Defaults,
    /// The file at the search path could not be used
    Fallback(PathBuf, anyhow::Error),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Defaults => debug!("No config file, using defaults"),
            ConfigSource::Fallback(path, e) => {
                warn!("Config {} not loaded, using defaults: {:#}", path.display(), e)
            }
        }
    }
}

impl Config {
    /// Default config file path in the user config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("letterlab").join("config.toml"))
    }

    /// `$LETTERLAB_CONFIG`, else the default path
    pub fn search_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path)
    }

    /// Load `explicit` (which must be readable) or the search path.
    ///
    /// A missing file at the search path is a quiet default; an unreadable
    /// one falls back to defaults and says why.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match explicit {
            Some(path) => {
                let config = Self::load_from_path(path)?;
                Ok((config, ConfigSource::File(path.to_path_buf())))
            }
            None => Ok(Self::load_search(Self::search_path())),
        }
    }

    fn load_search(path: Option<PathBuf>) -> (Self, ConfigSource) {
        match path {
            Some(path) if path.exists() => match Self::load_from_path(&path) {
                Ok(config) => (config, ConfigSource::File(path)),
                Err(e) => (Config::default(), ConfigSource::Fallback(path, e)),
            },
            _ => (Config::default(), ConfigSource::Defaults),
        }
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Write the default config to `path` (for init)
    pub fn save_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved default config to {}", path.display());
        Ok(())
    }
}
