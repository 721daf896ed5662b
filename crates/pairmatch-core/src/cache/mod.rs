//! Local key/value blob cache.
//!
//! Holds results recorded before the shared leaderboard existed and the last
//! player name entered on this machine.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::leaderboard::PlayerName;

/// Key under which legacy leaderboard results were cached
pub const LEGACY_LEADERBOARD_KEY: &str = "memoryGameLeaderboard";

/// Key of the most recently submitted player name
pub const PLAYER_NAME_KEY: &str = "memoryGamePlayerName";

pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key succeeds
    fn remove(&self, key: &str) -> Result<()>;
}

/// Cache kept in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryCache {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}

/// Cache storing each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::CacheError(format!("invalid cache key {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, value)?;
        debug!("Wrote cache key {} to {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Remember the player name for the next launch
pub fn remember_player_name(cache: &dyn LocalCache, name: &PlayerName) {
    if let Err(e) = cache.set(PLAYER_NAME_KEY, name.as_str()) {
        warn!("Failed to remember player name: {}", e);
    }
}

/// Player name saved by an earlier session, if it is still valid
pub fn last_player_name(cache: &dyn LocalCache) -> Option<PlayerName> {
    match cache.get(PLAYER_NAME_KEY) {
        Ok(value) => value.and_then(|v| PlayerName::parse(&v).ok()),
        Err(e) => {
            warn!("Failed to read saved player name: {}", e);
            None
        }
    }
}
