//! Error types for the label printing library

use thiserror::Error;

/// Label printing error types
///
/// These are local failures (bad input, bad configuration, storage).
/// Per-label service failures are reported as [`crate::FailureReason`]
/// inside a [`crate::BatchResult`] instead.
#[derive(Debug, Error)]
pub enum PrintError {
    /// Request rejected before any network activity
    #[error("{0}")]
    InvalidRequest(String),

    /// Invalid service configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error while reading or writing preferences
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preferences file could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PrintError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

/// Result type for label printing operations
pub type PrintResult<T> = Result<T, PrintError>;
