//! Error types for Steam Web API calls.

use thiserror::Error;

/// Result type alias for owned-games fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while fetching owned games.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    #[error("failed to make HTTP request: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether the request failed before a complete body was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Body(_))
    }
}
