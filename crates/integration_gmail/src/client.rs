//! Gmail REST client

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::GmailConfig;
use crate::error::GmailError;

/// Identifiers of an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SentMessage {
    pub id: String,
    #[serde(default, rename = "threadId")]
    pub thread_id: Option<String>,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    raw: &'a str,
}

#[derive(Debug, Clone)]
pub struct GmailClient {
    client: Client,
    config: GmailConfig,
}

impl GmailClient {
    pub fn new(config: GmailConfig) -> Result<Self, GmailError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GmailError::RequestFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn config(&self) -> &GmailConfig {
        &self.config
    }

    /// Submit an already encoded message as the authenticated user
    #[instrument(skip(self, access_token, raw), fields(raw_len = raw.len()))]
    pub async fn send_raw(
        &self,
        access_token: &SecretString,
        raw: &str,
    ) -> Result<SentMessage, GmailError> {
        let response = self
            .client
            .post(self.config.send_url())
            .bearer_auth(access_token.expose_secret())
            .json(&SendRequest { raw })
            .send()
            .await
            .map_err(|e| GmailError::from_transport(&e, self.config.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GmailError::from_transport(&e, self.config.timeout_secs))?;

        if !status.is_success() {
            let err = GmailError::from_api_status(status, &body);
            warn!(status = %status, error = %err, "Gmail send failed");
            return Err(err);
        }

        let sent: SentMessage = serde_json::from_str(&body)
            .map_err(|e| GmailError::InvalidResponse(format!("send response: {e}")))?;
        info!(message_id = %sent.id, "Gmail accepted message");
        Ok(sent)
    }
}
