use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// `clear` was called for a session that has no stored turns.
    #[error("session not found: {0}")]
    NotFound(String),

    /// The backing store failed (connection, command, ...).
    #[error("history backend error: {0}")]
    Backend(String),

    /// A stored turn could not be encoded or decoded.
    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid history configuration: {0}")]
    Config(String),
}

impl From<redis::RedisError> for HistoryError {
    fn from(e: redis::RedisError) -> Self {
        HistoryError::Backend(e.to_string())
    }
}
