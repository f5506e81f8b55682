//! Ratatoskr cache error types

use std::time::Duration;

/// Ratatoskr cache error types
#[derive(Debug, thiserror::Error)]
pub enum RatatoskrError {
    // Gateway errors, passed through from the wrapped gateway untouched
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),

    // Codec errors
    /// The result variant has no stable snapshot and cannot be cached.
    #[error("result variant '{0}' cannot be encoded")]
    UnsupportedVariant(&'static str),

    /// A cached payload could not be turned back into a result.
    #[error("failed to decode cached result: {0}")]
    Decode(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Store errors
    #[error("cache store error: {0}")]
    Cache(String),

    /// Another caller's computation for the same key failed while this one
    /// waited on it. Carries that error's message.
    #[error("concurrent computation failed: {0}")]
    Coalesced(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for Ratatoskr cache operations
pub type Result<T> = std::result::Result<T, RatatoskrError>;
