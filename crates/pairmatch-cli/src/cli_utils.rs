//! Common CLI utility functions shared across commands.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use pairmatch_core::{FileCache, InMemoryBackend, LeaderboardBackend, LeaderboardStore, LocalCache};
use tracing::{info, warn};

use crate::rest_backend::RestBackend;
use crate::settings::Settings;

/// Open the leaderboard store configured in `settings`.
///
/// Without an endpoint the board lives only as long as this process.
pub fn open_store(settings: &Settings) -> Arc<LeaderboardStore> {
    let backend: Arc<dyn LeaderboardBackend> = match settings.store.endpoint.as_deref() {
        Some(endpoint) => {
            let api_key = settings.store.api_key.as_deref().unwrap_or_default();
            if api_key.is_empty() {
                warn!("No store API key configured; requests will be anonymous");
            }
            info!("Using leaderboard store at {}", endpoint);
            Arc::new(RestBackend::new(endpoint, api_key, &settings.store))
        }
        None => {
            warn!("No store endpoint configured, scores are kept for this session only");
            Arc::new(InMemoryBackend::new())
        }
    };

    Arc::new(LeaderboardStore::new(backend).with_default_limit(settings.game.leaderboard_limit))
}

/// Open the local cache directory.
pub fn open_cache(settings: &Settings) -> Arc<dyn LocalCache> {
    Arc::new(FileCache::new(settings.cache_dir()))
}

/// Print `message` and read one trimmed line; `None` on end of input.
pub fn prompt(message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
