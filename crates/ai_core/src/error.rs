//! Inference errors

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while talking to the Messages API
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Client could not be built from the configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failed to connect to the API
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request failed for another transport reason
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// API key missing, invalid or lacking permission
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// API rejected the request body
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout waiting for the API
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Server error or overload
    #[error("Server error: {0}")]
    ServerError(String),
}

impl InferenceError {
    /// Whether a later attempt could succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Timeout(_) | Self::RateLimited | Self::ServerError(_)
        )
    }

    /// Classify a transport error
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_transport(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout.as_millis() as u64)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// Classify a non-success HTTP status with its body
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = ApiErrorBody::message_from(body)
            .unwrap_or_else(|| format!("status {status}: {}", truncate(body, 300)));

        match status.as_u16() {
            401 | 403 => Self::Authentication(message),
            429 => Self::RateLimited,
            400 | 404 | 413 | 422 => Self::InvalidRequest(message),
            code if code >= 500 => Self::ServerError(message),
            _ => Self::RequestFailed(message),
        }
    }
}

/// `{"type":"error","error":{"type":"...","message":"..."}}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

impl ApiErrorBody {
    fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .map(|parsed| format!("{}: {}", parsed.error.error_type, parsed.error.message))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
