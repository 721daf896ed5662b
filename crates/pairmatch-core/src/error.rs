use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid transition for card {card_id}: {reason}")]
    InvalidTransition { card_id: u32, reason: &'static str },

    #[error("Leaderboard store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Legacy migration failed: {0}")]
    MigrationFailed(String),

    #[error("Invalid player name: {0}")]
    InvalidPlayerName(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Local cache error: {0}")]
    CacheError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_transition(card_id: u32, reason: &'static str) -> Self {
        Error::InvalidTransition { card_id, reason }
    }

    /// Whether this error came from a rejected card flip
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Error::InvalidTransition { .. })
    }

    /// Whether this error means the store could not be reached
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
