//! Error types for studytrail-core

use thiserror::Error;

/// Main error type for the studytrail-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The chat provider declined to answer (rate limit or safety filter)
    #[error("chat provider rejected the request: {0}")]
    SafetyRejected(String),

    /// The chat provider's reply hit the output token ceiling
    #[error("chat reply truncated at {max_tokens} output tokens")]
    Truncated { max_tokens: u32 },

    /// Chat endpoint error (transport or malformed response)
    #[error("chat error: {0}")]
    Chat(String),
}

/// Result type alias for studytrail-core
pub type Result<T> = std::result::Result<T, Error>;
