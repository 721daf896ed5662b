//! Settings file for the CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pairmatch_core::GameConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default REST table holding leaderboard rows
pub const DEFAULT_TABLE: &str = "leaderboard";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub store: StoreSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Base URL of the REST service; no endpoint means a session-only board
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
    /// How often watchers poll the table for changes
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            table: DEFAULT_TABLE.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl StoreSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Directory of the local cache files
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// `<config dir>/pairmatch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pairmatch").join("config.toml"))
    }

    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Parse settings from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.game.validate()?;
        Ok(settings)
    }

    /// Settings from an explicit file, or the default file when it exists
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                debug!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line and environment overrides
    pub fn with_overrides(mut self, endpoint: Option<&str>, api_key: Option<&str>) -> Self {
        if let Some(endpoint) = endpoint {
            self.store.endpoint = Some(endpoint.to_string());
        }
        if let Some(api_key) = api_key {
            self.store.api_key = Some(api_key.to_string());
        }
        self
    }

    /// Directory of the local cache
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("pairmatch")))
            .unwrap_or_else(|| PathBuf::from(".pairmatch"))
    }
}
