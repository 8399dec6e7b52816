//! Configuration types for the mention tracker.
//!
//! Loaded from `config.toml`. Every section and field is optional; missing
//! values fall back to the defaults below.

use crate::error::{Result, TrackerError};
use mention_search::types::{DEFAULT_MAX_RESULTS, DEFAULT_WINDOW_DAYS};
use mention_search::{CollectorConfig, SortOrder, StrategyKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Defaults applied to every search unless overridden on the command line.
    pub search: SearchDefaults,
    /// HTTP, pacing and strategy settings, including `[collector.browser]`.
    pub collector: CollectorConfig,
    /// CSV export settings.
    pub export: ExportConfig,
}

/// Per-search defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    /// Trailing window length in days.
    pub days: i64,
    /// Maximum mentions kept per search.
    pub max_results: usize,
    /// Reddit sort order.
    pub sort: SortOrder,
    /// Strategies to run, highest priority first.
    pub strategies: Vec<StrategyKind>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
            max_results: DEFAULT_MAX_RESULTS,
            sort: SortOrder::default(),
            strategies: StrategyKind::all().to_vec(),
        }
    }
}

/// CSV export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the default-named CSV file is written to.
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| TrackerError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TrackerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/mention-tracker/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("mention-tracker")
                .join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("mention-tracker")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/mention-tracker-config/config.toml")
        }
    }

    /// Load `explicit` if given, else the default path if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be loaded, or if
    /// the loaded config is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_config_path();
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "loading default config");
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.search.days <= 0 {
            return Err(TrackerError::Config(
                "search.days must be greater than 0".into(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(TrackerError::Config(
                "search.max_results must be greater than 0".into(),
            ));
        }
        self.collector
            .validate()
            .map_err(|e| TrackerError::Config(format!("collector: {e}")))
    }
}
