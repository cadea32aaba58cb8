//! Gmail and OAuth error types

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors from the Gmail API or the OAuth token endpoint
#[derive(Debug, Error)]
pub enum GmailError {
    /// Access token refused by the API
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Refresh token revoked or expired (`invalid_grant`)
    #[error("Refresh token expired or revoked: {0}")]
    AuthExpired(String),

    /// Token endpoint refused the refresh for another reason
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Credential files are malformed or incomplete
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Message could not be built
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// API refused the message itself
    #[error("Rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Too many requests or quota throttling
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 5xx or request timeout reported by the server
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Network connection error
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Client-side timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Other transport failure
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GmailError {
    /// Whether a later attempt could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_)
                | Self::ServerError { .. }
                | Self::ConnectionFailed(_)
                | Self::Timeout(_)
                | Self::RequestFailed(_)
        )
    }

    /// Whether the failure is about credentials rather than the message
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_)
                | Self::AuthExpired(_)
                | Self::RefreshFailed(_)
                | Self::InvalidCredentials(_)
        )
    }

    pub(crate) fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// Classify a failed Gmail API response
    pub fn from_api_status(status: StatusCode, body: &str) -> Self {
        let detail = ApiErrorBody::parse(body);
        let message = detail
            .as_ref()
            .map_or_else(|| body.chars().take(300).collect(), |d| d.message.clone());
        let reason = detail.as_ref().and_then(|d| d.reason.clone()).unwrap_or_default();

        match status.as_u16() {
            401 => Self::Unauthorized(message),
            403 if reason.contains("RateLimitExceeded") || reason == "rateLimitExceeded" => {
                Self::RateLimited(message)
            },
            403 if reason.contains("insufficientPermissions")
                || message.to_lowercase().contains("insufficient authentication scopes") =>
            {
                Self::Unauthorized(message)
            },
            429 => Self::RateLimited(message),
            code @ (408 | 500..=599) => Self::ServerError {
                status: code,
                message,
            },
            code => Self::Rejected {
                status: code,
                message,
            },
        }
    }
}

/// Google JSON error envelope:
/// `{"error": {"code": 400, "message": "...", "errors": [{"reason": "..."}]}}`
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorInner,
}

#[derive(Debug, Deserialize)]
struct ApiErrorInner {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    reason: Option<String>,
}

struct ApiErrorBody {
    message: String,
    reason: Option<String>,
}

impl ApiErrorBody {
    fn parse(body: &str) -> Option<Self> {
        let envelope: ApiErrorEnvelope = serde_json::from_str(body).ok()?;
        Some(Self {
            reason: envelope
                .error
                .errors
                .into_iter()
                .find_map(|item| item.reason),
            message: envelope.error.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn google_error(code: u16, message: &str, reason: &str) -> String {
        serde_json::json!({
            "error": {
                "code": code,
                "message": message,
                "errors": [{"message": message, "domain": "global", "reason": reason}],
                "status": "ERROR"
            }
        })
        .to_string()
    }

    #[test]
    fn unauthorized_is_auth_not_retryable() {
        let err = GmailError::from_api_status(
            StatusCode::UNAUTHORIZED,
            &google_error(401, "Invalid Credentials", "authError"),
        );
        assert!(matches!(err, GmailError::Unauthorized(ref m) if m == "Invalid Credentials"));
        assert!(err.is_auth());
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let err = GmailError::from_api_status(
            StatusCode::BAD_REQUEST,
            &google_error(400, "Invalid To header", "invalidArgument"),
        );
        assert!(matches!(err, GmailError::Rejected { status: 400, .. }));
        assert!(!err.is_retryable());
        assert!(!err.is_auth());
    }

    #[test]
    fn user_rate_limit_on_403_is_retryable() {
        let err = GmailError::from_api_status(
            StatusCode::FORBIDDEN,
            &google_error(403, "User-rate limit exceeded", "userRateLimitExceeded"),
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_scope_is_auth() {
        let err = GmailError::from_api_status(
            StatusCode::FORBIDDEN,
            &google_error(
                403,
                "Request had insufficient authentication scopes.",
                "insufficientPermissions",
            ),
        );
        assert!(err.is_auth());
    }

    #[test]
    fn server_errors_and_429_are_retryable() {
        assert!(GmailError::from_api_status(StatusCode::SERVICE_UNAVAILABLE, "").is_retryable());
        assert!(GmailError::from_api_status(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
        assert!(GmailError::from_api_status(StatusCode::REQUEST_TIMEOUT, "").is_retryable());
    }

    #[test]
    fn non_json_body_is_kept_as_message() {
        let err = GmailError::from_api_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, GmailError::ServerError { status: 502, ref message } if message.contains("bad gateway")));
    }
}
