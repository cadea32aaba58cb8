//! Google OAuth refresh-token grant

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::GmailError;

const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Access token issued by the token endpoint
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: SecretString,
    pub expires_in: u64,
    pub scope: Option<String>,
}

impl RefreshedToken {
    /// Absolute expiry relative to `now`
    #[must_use]
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + chrono::Duration::seconds(i64::try_from(self.expires_in).unwrap_or(3600))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    client: Client,
    timeout_secs: u64,
}

impl OAuthClient {
    pub fn new(timeout: Duration) -> Result<Self, GmailError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GmailError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Exchange a refresh token for a new access token
    #[instrument(skip(self, client_secret, refresh_token), fields(token_uri = %token_uri))]
    pub async fn refresh(
        &self,
        token_uri: &str,
        client_id: &str,
        client_secret: Option<&SecretString>,
        refresh_token: &SecretString,
    ) -> Result<RefreshedToken, GmailError> {
        let mut form = vec![
            ("client_id", client_id.to_string()),
            ("refresh_token", refresh_token.expose_secret().to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];
        if let Some(secret) = client_secret {
            form.push(("client_secret", secret.expose_secret().to_string()));
        }

        let response = self
            .client
            .post(token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| GmailError::from_transport(&e, self.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GmailError::from_transport(&e, self.timeout_secs))?;

        if !status.is_success() {
            warn!(status = %status, "Token refresh rejected");
            return Err(map_refresh_error(status.as_u16(), &body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| GmailError::InvalidResponse(format!("token response: {e}")))?;
        if parsed.access_token.trim().is_empty() {
            return Err(GmailError::InvalidResponse(
                "token response has an empty access_token".into(),
            ));
        }

        let expires_in = parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        debug!(expires_in, "Access token issued");
        Ok(RefreshedToken {
            access_token: SecretString::from(parsed.access_token),
            expires_in,
            scope: parsed.scope,
        })
    }
}

/// Classify a token endpoint failure
///
/// `invalid_grant` means the refresh token itself is dead and the user has
/// to re-authorize; other 4xx responses are client misconfiguration.
fn map_refresh_error(status: u16, body: &str) -> GmailError {
    let lower = body.to_lowercase();
    if matches!(status, 400 | 401)
        && (lower.contains("invalid_grant") || lower.contains("token has been expired"))
    {
        return GmailError::AuthExpired(summarize(body));
    }
    match status {
        429 => GmailError::RateLimited(summarize(body)),
        500..=599 => GmailError::ServerError {
            status,
            message: summarize(body),
        },
        _ => GmailError::RefreshFailed(format!("HTTP {status}: {}", summarize(body))),
    }
}

fn summarize(body: &str) -> String {
    #[derive(Deserialize)]
    struct OAuthErrorBody {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    }

    serde_json::from_str::<OAuthErrorBody>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |parsed| match parsed.error_description {
            Some(description) => format!("{}: {description}", parsed.error),
            None => parsed.error,
        },
    )
}
