//! Brave Search failures and their classification

use reqwest::StatusCode;
use thiserror::Error;

/// Longest slice of an error body carried into the message
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum WebSearchError {
    #[error("Brave Search API key is not configured")]
    MissingApiKey,

    #[error("Invalid search settings: {0}")]
    InvalidSettings(String),

    #[error("Search query is empty")]
    EmptyQuery,

    /// 401 or 403: the subscription token was refused
    #[error("Brave Search refused the subscription token (HTTP {0})")]
    Unauthorized(u16),

    /// 429, with the `Retry-After` hint when Brave sends one
    #[error("Brave Search quota exhausted (retry after {retry_after_secs:?}s)")]
    Throttled { retry_after_secs: Option<u64> },

    #[error("Brave Search unavailable (HTTP {status}): {body}")]
    Unavailable { status: u16, body: String },

    /// Any other non-success status
    #[error("Brave Search rejected the request (HTTP {status}): {body}")]
    Refused { status: u16, body: String },

    #[error("Could not reach Brave Search: {0}")]
    Unreachable(String),

    #[error("No answer from Brave Search within {0}s")]
    TimedOut(u64),

    #[error("Search request failed: {0}")]
    Transport(String),

    #[error("Unreadable search response: {0}")]
    MalformedBody(String),
}

impl WebSearchError {
    /// Whether repeating the same query later could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Throttled { .. }
                | Self::Unavailable { .. }
                | Self::Unreachable(_)
                | Self::TimedOut(_)
        )
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> Self {
        let body: String = body.trim().chars().take(BODY_EXCERPT_CHARS).collect();
        match status.as_u16() {
            code @ (401 | 403) => Self::Unauthorized(code),
            429 => Self::Throttled { retry_after_secs },
            status @ (408 | 500..=599) => Self::Unavailable { status, body },
            status => Self::Refused { status, body },
        }
    }

    pub(crate) fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::TimedOut(timeout_secs)
        } else if err.is_connect() {
            Self::Unreachable(err.to_string())
        } else if err.is_decode() {
            Self::MalformedBody(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
