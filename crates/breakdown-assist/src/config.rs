//! Configuration management for breakdown-assist.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::DEFAULT_PAGE_LINES;
use crate::manager::DEFAULT_UTC_OFFSET_MINUTES;
use crate::store::sqlite::DEFAULT_TABLE;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "breakdown-assist";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "breakdowns.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BDASSIST_`)
/// 2. TOML config file at `~/.config/breakdown-assist/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tabular store configuration.
    pub store: StoreConfig,
    /// Snapshot cache configuration.
    pub cache: CacheConfig,
    /// Behavior policy knobs.
    pub policy: PolicyConfig,
    /// Time zone configuration.
    pub time: TimeConfig,
    /// Export configuration.
    pub export: ExportConfig,
    /// Session defaults.
    pub session: SessionConfig,
}

/// Which tabular store backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Local `SQLite` file.
    #[default]
    Sqlite,
    /// Ephemeral in-memory table.
    Memory,
}

/// Store-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to open.
    pub backend: StoreBackend,
    /// Path to the database file.
    /// Defaults to `~/.local/share/breakdown-assist/breakdowns.db`
    pub database_path: Option<PathBuf>,
    /// Name of the table holding breakdown rows.
    pub table: String,
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Freshness window in seconds. 0 disables caching.
    pub ttl_secs: u64,
}

/// Behavior policy knobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Hard-require a resolver name when entering Resolved.
    pub enforce_resolver_required: bool,
}

/// Time zone configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Fixed UTC offset for every recorded timestamp, in minutes.
    pub utc_offset_minutes: i32,
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Text lines per card page.
    pub page_lines: usize,
}

/// Session defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Actor recorded as `added_by`/`resolved_by` when none is given.
    pub actor: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_path: None, // Will be resolved to default at runtime
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 60 }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_lines: DEFAULT_PAGE_LINES,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            actor: "System".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `BDASSIST_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("BDASSIST_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.export.page_lines == 0 {
            return Err(Error::ConfigValidation {
                message: "page_lines must be greater than 0".to_string(),
            });
        }

        if self.time.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "utc_offset_minutes ({}) must be within a day of UTC",
                    self.time.utc_offset_minutes
                ),
            });
        }

        let table = &self.store.table;
        let valid_start = table
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !(valid_start && valid_rest) {
            return Err(Error::ConfigValidation {
                message: format!("invalid table name: {table:?}"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the cache freshness window as a Duration.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Get the fixed time zone all timestamps are recorded in.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured offset is out of range (validation
    /// normally catches this earlier).
    pub fn timezone(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.time.utc_offset_minutes * 60).ok_or_else(|| {
            Error::ConfigValidation {
                message: format!(
                    "utc_offset_minutes ({}) is out of range",
                    self.time.utc_offset_minutes
                ),
            }
        })
    }
}
