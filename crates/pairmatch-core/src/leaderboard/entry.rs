use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::player::MAX_NAME_CHARS;
use crate::error::{Error, Result};

/// Opaque identifier assigned by the store
///
/// Stores hand out either textual ids (UUIDs) or numeric ids; both are kept
/// as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawEntryId", into = "String")]
pub struct EntryId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntryId {
    Text(String),
    Number(i64),
}

impl From<RawEntryId> for EntryId {
    fn from(raw: RawEntryId) -> Self {
        match raw {
            RawEntryId::Text(s) => EntryId(s),
            RawEntryId::Number(n) => EntryId(n.to_string()),
        }
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl EntryId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trimmed, non-empty player name of at most 20 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPlayerName("name is empty".to_string()));
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_CHARS {
            return Err(Error::InvalidPlayerName(format!(
                "name has {} characters, at most {} allowed",
                len, MAX_NAME_CHARS
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Trim and cut a name down to the allowed length instead of rejecting it
    pub fn truncated(input: &str) -> Option<Self> {
        let cut: String = input.trim().chars().take(MAX_NAME_CHARS).collect();
        Self::parse(&cut).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PlayerName> for String {
    fn from(name: PlayerName) -> Self {
        name.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate row for insertion; the store assigns id and, usually, timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub player_name: PlayerName,
    pub score: u32,
    pub time_seconds: u32,
    pub moves: u32,
    /// Only set when carrying over a result recorded elsewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    pub fn new(player_name: PlayerName, score: u32, time_seconds: u32, moves: u32) -> Self {
        Self {
            player_name,
            score,
            time_seconds,
            moves,
            created_at: None,
        }
    }
}

/// Batch whose rows all serialize with the same keys
///
/// When some rows carry a timestamp and others do not, the missing ones are
/// set to `now`. Batches without any timestamp are returned unchanged.
pub fn uniform_batch(entries: &[NewEntry], now: DateTime<Utc>) -> Vec<NewEntry> {
    let any_timestamp = entries.iter().any(|e| e.created_at.is_some());
    entries
        .iter()
        .cloned()
        .map(|mut entry| {
            if any_timestamp {
                entry.created_at.get_or_insert(now);
            }
            entry
        })
        .collect()
}

/// A persisted leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: EntryId,
    /// Name as stored; rows written by other clients may not be valid `PlayerName`s
    pub player_name: String,
    pub score: u32,
    pub time_seconds: u32,
    pub moves: u32,
    pub created_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn from_new(id: EntryId, entry: &NewEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            player_name: entry.player_name.to_string(),
            score: entry.score,
            time_seconds: entry.time_seconds,
            moves: entry.moves,
            created_at: entry.created_at.unwrap_or(created_at),
        }
    }
}

/// Ranking order: higher score first, then faster time
pub fn rank_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.time_seconds.cmp(&b.time_seconds))
}

/// Sort entries into ranking order, keeping arrival order for full ties
pub fn sort_ranked(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(rank_order);
}
