use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::reminder::types::Language;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CareConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub scheduler: SchedulerConfig,
    pub housekeeping: HousekeepingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub log_level: String,
    /// Language tag used when a caller supplies a tag with no grammar table.
    pub default_language: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Buffer size of the scheduler event broadcast channel.
    pub event_capacity: usize,
    /// Upper bound on "for N days"; longer requests are clamped.
    pub max_series_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HousekeepingConfig {
    pub retention_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            default_language: "en".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_careminder_dir()
            .join("reminders.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            max_series_days: 365,
        }
    }
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self { retention_days: 7 }
    }
}

/// Returns `~/.careminder/`, or `./.careminder/` when no home directory is known.
pub fn default_careminder_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".careminder")
}

/// Returns the default config file path: `~/.careminder/config.toml`
pub fn default_config_path() -> PathBuf {
    default_careminder_dir().join("config.toml")
}

impl CareConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CareConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (CAREMINDER_DB, CAREMINDER_LANG, CAREMINDER_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CAREMINDER_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("CAREMINDER_LANG") {
            self.engine.default_language = val;
        }
        if let Ok(val) = std::env::var("CAREMINDER_LOG_LEVEL") {
            self.engine.log_level = val;
        }
    }

    /// The configured default language, or English for an unknown tag.
    pub fn default_language(&self) -> Language {
        self.engine.default_language.parse().unwrap_or_else(|_| {
            tracing::warn!(tag = %self.engine.default_language, "unknown default language, using en");
            Language::English
        })
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
