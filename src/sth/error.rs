//! History fetch error types
//!
//! Everything that can abort a poll cycle. None of these are fatal: the
//! poller logs them and keeps the last good series on screen.

use thiserror::Error;

/// Errors that can occur while fetching attribute history
#[derive(Error, Debug)]
pub enum FetchError {
    /// History API could not be reached
    #[error("History API unavailable")]
    Unavailable,

    /// Request did not complete within the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Other transport-level failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// History API answered with a non-success status
    #[error("History API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not valid JSON or had the wrong types
    #[error("Invalid history response: {0}")]
    Decode(#[from] serde_json::Error),

    /// JSON was valid but the envelope is missing required parts
    #[error("Unexpected history response shape: {0}")]
    Shape(String),
}

impl FetchError {
    /// Classify a reqwest error the way the poller reports it
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Unavailable
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Result type alias for history fetches
pub type FetchResult<T> = Result<T, FetchError>;
