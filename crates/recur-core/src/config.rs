use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::schedule::IntervalTable;

/// User configuration, loaded from `<config_dir>/recur/config.toml`.
///
/// Every field has a default matching the stock review ladder, so a
/// missing file is fully usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub intervals: IntervalConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            intervals: IntervalConfig::default(),
            defaults: DefaultsConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// Base review intervals in days.
    #[serde(default = "default_base_intervals")]
    pub base: Vec<u32>,
    /// Symmetric jitter fraction applied to each interval (0.15 = ±15%).
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    /// Minimum interval after jitter and clamping.
    #[serde(default = "default_min_interval")]
    pub min: u32,
    /// Maximum interval after jitter and clamping.
    #[serde(default = "default_max_interval")]
    pub max: u32,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            base: default_base_intervals(),
            jitter: default_jitter(),
            min: default_min_interval(),
            max: default_max_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Number of reviews scheduled per registration.
    #[serde(default = "default_review_times")]
    pub review_times: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            review_times: default_review_times(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Database file location. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, resolving the file path from the `RECUR_CONFIG`
    /// environment variable or the platform config directory. A missing
    /// file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = env::var("RECUR_CONFIG") {
            return Self::load_from(Path::new(&explicit));
        }

        let Some(config_dir) = dirs::config_dir() else {
            return Ok(Self::default());
        };

        let path = config_dir.join("recur/config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file path. A missing file
    /// yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Build the validated interval table from `[intervals]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] for unusable interval
    /// parameters.
    pub fn interval_table(&self) -> Result<IntervalTable, CoreError> {
        IntervalTable::new(
            self.intervals.base.clone(),
            self.intervals.jitter,
            self.intervals.min,
            self.intervals.max,
        )
    }

    /// Resolve the database file location: `RECUR_DB` env var, then the
    /// configured path, then `<data_dir>/recur/reviews.db`.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        if let Ok(explicit) = env::var("RECUR_DB") {
            return PathBuf::from(explicit);
        }
        if let Some(ref path) = self.database.path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recur/reviews.db")
    }
}

fn default_base_intervals() -> Vec<u32> {
    vec![1, 7, 18, 35]
}

const fn default_jitter() -> f64 {
    0.15
}

const fn default_min_interval() -> u32 {
    1
}

const fn default_max_interval() -> u32 {
    365
}

const fn default_review_times() -> u32 {
    4
}
