//! Error types for DevBot.

use thiserror::Error;

/// Crate-wide error type.
///
/// Only [`DevbotError::InvalidInput`] is expected to reach the HTTP layer;
/// store and generation failures are absorbed by the resolver.
#[derive(Debug, Error)]
pub enum DevbotError {
    /// The persisted store could not be read. Logged, never returned by `load()`.
    #[error("Store read error: {0}")]
    StoreRead(String),

    /// The persisted store could not be written.
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// The answer provider failed or returned nothing usable.
    #[error("Generation error: {0}")]
    Generation(String),

    /// The answer provider did not respond in time.
    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    /// The question was empty or otherwise unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DevbotError {
    /// True for errors caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result alias using [`DevbotError`].
pub type Result<T> = std::result::Result<T, DevbotError>;
