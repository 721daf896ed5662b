//! Leaderboard table behind a PostgREST-style HTTP API.
//!
//! Rows are read and written with plain REST calls. Change feeds are
//! emulated by polling the row count and newest row on a background thread,
//! so edits to older rows are not reported.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use pairmatch_core::leaderboard::{ChangeEvent, ChangeFeed, WatchId, uniform_batch};
use pairmatch_core::{Error, LeaderboardBackend, LeaderboardEntry, NewEntry, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::settings::StoreSettings;

#[derive(Clone)]
struct Endpoint {
    agent: ureq::Agent,
    table_url: String,
    api_key: String,
}

pub struct RestBackend {
    endpoint: Endpoint,
    poll_interval: Duration,
    watchers: Mutex<HashMap<WatchId, Sender<()>>>,
    next_watch: AtomicU64,
}

impl RestBackend {
    pub fn new(base_url: &str, api_key: &str, settings: &StoreSettings) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(settings.timeout()))
            .build();
        let agent: ureq::Agent = config.into();

        Self {
            endpoint: Endpoint {
                agent,
                table_url: table_url(base_url, &settings.table),
                api_key: api_key.to_string(),
            },
            poll_interval: settings.poll_interval(),
            watchers: Mutex::new(HashMap::new()),
            next_watch: AtomicU64::new(1),
        }
    }
}

impl LeaderboardBackend for RestBackend {
    fn insert_one(&self, entry: &NewEntry) -> Result<LeaderboardEntry> {
        let mut response = self
            .endpoint
            .post()
            .header("Prefer", "return=representation")
            .send_json(std::slice::from_ref(entry))
            .map_err(transport)?;

        let rows: Vec<LeaderboardEntry> = response.body_mut().read_json().map_err(transport)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::StoreUnavailable("insert returned no row".to_string()))
    }

    fn insert_many(&self, entries: &[NewEntry]) -> Result<usize> {
        // Bulk inserts are rejected unless every object has the same keys
        let batch = uniform_batch(entries, Utc::now());
        self.endpoint
            .post()
            .header("Prefer", "return=minimal")
            .send_json(&batch)
            .map_err(transport)?;
        Ok(entries.len())
    }

    fn query_ordered(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let mut response = self
            .endpoint
            .get()
            .query("select", "*")
            .query("order", "score.desc,time_seconds.asc")
            .query("limit", limit.to_string())
            .call()
            .map_err(transport)?;

        response.body_mut().read_json().map_err(transport)
    }

    fn watch(&self) -> Result<ChangeFeed> {
        let mut last = self.endpoint.fingerprint()?;

        let id = WatchId(self.next_watch.fetch_add(1, Ordering::SeqCst));
        let (event_tx, event_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let endpoint = self.endpoint.clone();
        let interval = self.poll_interval;
        thread::Builder::new()
            .name(format!("leaderboard-poll-{}", id.0))
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let current = match endpoint.fingerprint() {
                        Ok(current) => current,
                        Err(e) => {
                            debug!("Leaderboard poll failed: {}", e);
                            continue;
                        }
                    };
                    if let Some(event) = last.change_to(&current) {
                        if event_tx.send(event).is_err() {
                            break;
                        }
                        last = current;
                    }
                }
                debug!("Leaderboard poller {} stopped", id.0);
            })?;

        self.watchers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, stop_tx);
        Ok(ChangeFeed {
            id,
            events: event_rx,
        })
    }

    fn unwatch(&self, id: WatchId) {
        // Dropping the stop sender ends the poller, which closes the feed
        let removed = self
            .watchers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        if removed.is_none() {
            warn!("Unwatch of unknown leaderboard watch {}", id.0);
        }
    }
}

impl Endpoint {
    fn get(&self) -> ureq::RequestBuilder<ureq::typestate::WithoutBody> {
        self.agent
            .get(&self.table_url)
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.api_key))
    }

    fn post(&self) -> ureq::RequestBuilder<ureq::typestate::WithBody> {
        self.agent
            .post(&self.table_url)
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.api_key))
    }

    /// Row count and newest row id
    fn fingerprint(&self) -> Result<Fingerprint> {
        let mut response = self
            .get()
            .header("Prefer", "count=exact")
            .query("select", "id")
            .query("order", "created_at.desc")
            .query("limit", "1")
            .call()
            .map_err(transport)?;

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_total);
        let newest: Vec<IdOnly> = response.body_mut().read_json().map_err(transport)?;

        Ok(Fingerprint {
            total,
            newest: newest.into_iter().next().map(|row| row.id.to_string()),
        })
    }
}

#[derive(Deserialize)]
struct IdOnly {
    id: serde_json::Value,
}

/// What the poller compares between two polls
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    total: Option<u64>,
    newest: Option<String>,
}

impl Fingerprint {
    fn change_to(&self, current: &Fingerprint) -> Option<ChangeEvent> {
        if self == current {
            return None;
        }
        match (self.total, current.total) {
            (Some(before), Some(after)) if after < before => Some(ChangeEvent::Deleted),
            (Some(before), Some(after)) if after == before => Some(ChangeEvent::Updated),
            _ => Some(ChangeEvent::Inserted),
        }
    }
}

fn table_url(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
}

/// Total from a `Content-Range` header such as `0-0/42` or `*/0`
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit_once('/')?.1.trim().parse().ok()
}

fn transport(error: impl std::fmt::Display) -> Error {
    Error::StoreUnavailable(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(total: Option<u64>, newest: Option<&str>) -> Fingerprint {
        Fingerprint {
            total,
            newest: newest.map(str::to_string),
        }
    }

    #[test]
    fn test_table_url() {
        assert_eq!(
            table_url("https://example.supabase.co/", "leaderboard"),
            "https://example.supabase.co/rest/v1/leaderboard"
        );
    }

    #[test]
    fn test_parse_total() {
        assert_eq!(parse_total("0-0/42"), Some(42));
        assert_eq!(parse_total("*/0"), Some(0));
        assert_eq!(parse_total("0-9/*"), None);
        assert_eq!(parse_total("garbage"), None);
    }

    #[test]
    fn test_fingerprint_changes() {
        let before = fingerprint(Some(3), Some("c"));

        assert_eq!(before.change_to(&before.clone()), None);
        assert_eq!(
            before.change_to(&fingerprint(Some(4), Some("d"))),
            Some(ChangeEvent::Inserted)
        );
        assert_eq!(
            before.change_to(&fingerprint(Some(2), Some("b"))),
            Some(ChangeEvent::Deleted)
        );
        assert_eq!(
            before.change_to(&fingerprint(Some(3), Some("x"))),
            Some(ChangeEvent::Updated)
        );
        assert_eq!(
            before.change_to(&fingerprint(None, Some("x"))),
            Some(ChangeEvent::Inserted)
        );
    }

    #[test]
    fn test_entries_decode_from_rest_rows() {
        let rows: Vec<LeaderboardEntry> = serde_json::from_str(
            r#"[{"id": 17, "player_name": "Ann", "score": 750, "time_seconds": 40,
                 "moves": 9, "created_at": "2024-03-01T10:00:00.123456+00:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].id.as_str(), "17");
        assert_eq!(rows[0].score, 750);
    }

    #[test]
    fn test_long_stored_name_does_not_drop_board() {
        let rows: Vec<LeaderboardEntry> = serde_json::from_str(
            r#"[{"id": 1, "player_name": "Ann", "score": 750, "time_seconds": 40,
                 "moves": 9, "created_at": "2024-03-01T10:00:00+00:00"},
                {"id": 2, "player_name": "ThisNameIsTwentyOneX!", "score": 600,
                 "time_seconds": 55, "moves": 11, "created_at": "2024-03-01T10:01:00+00:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].player_name, "ThisNameIsTwentyOneX!");
    }
}
