//! Gmail adapters - Implement MailTransportPort and TokenRefreshPort

use std::time::Duration;

use application::error::{ApplicationError, DeliveryError};
use application::ports::{AccessGrant, MailTransportPort, OutgoingMail, TokenRefreshPort};
use async_trait::async_trait;
use chrono::Utc;
use domain::MailCredential;
use integration_gmail::{
    EmailComposition, GmailClient, GmailConfig, GmailError, OAuthClient, build_raw_message,
};
use secrecy::SecretString;
use tracing::{debug, instrument};

/// Sends mail through `users.messages.send`
#[derive(Debug, Clone)]
pub struct GmailTransportAdapter {
    client: GmailClient,
}

impl GmailTransportAdapter {
    pub fn new(config: GmailConfig) -> Result<Self, ApplicationError> {
        let client = GmailClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }

    /// Classify a Gmail error for the dispatcher's retry loop
    ///
    /// An undecodable success body is permanent: the message may already
    /// have been accepted and must not be sent twice.
    fn map_error(err: GmailError) -> DeliveryError {
        if err.is_auth() {
            DeliveryError::Auth(err.to_string())
        } else if err.is_retryable() {
            DeliveryError::Transient(err.to_string())
        } else {
            DeliveryError::Permanent(err.to_string())
        }
    }
}

#[async_trait]
impl MailTransportPort for GmailTransportAdapter {
    #[instrument(skip(self, access_token, mail), fields(to = %mail.to))]
    async fn send(
        &self,
        access_token: &SecretString,
        mail: &OutgoingMail,
    ) -> Result<String, DeliveryError> {
        let raw = build_raw_message(&EmailComposition {
            from: mail.from.as_str(),
            to: mail.to.as_str(),
            subject: &mail.subject,
            text_body: &mail.text_body,
            html_body: &mail.html_body,
        })
        .map_err(Self::map_error)?;

        let sent = self
            .client
            .send_raw(access_token, &raw)
            .await
            .map_err(Self::map_error)?;

        debug!(id = %sent.id, thread_id = ?sent.thread_id, "Gmail accepted message");
        Ok(sent.id)
    }
}

/// Refreshes access tokens at the credential's token endpoint
#[derive(Debug, Clone)]
pub struct GmailTokenRefresher {
    client: OAuthClient,
}

impl GmailTokenRefresher {
    pub fn new(timeout: Duration) -> Result<Self, ApplicationError> {
        let client =
            OAuthClient::new(timeout).map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }

    fn map_error(err: GmailError) -> ApplicationError {
        match err {
            e if e.is_auth() => ApplicationError::NotAuthorized(e.to_string()),
            GmailError::RateLimited(_) => ApplicationError::RateLimited,
            GmailError::Timeout(secs) => {
                ApplicationError::Timeout(format!("token endpoint did not answer within {secs}s"))
            },
            GmailError::InvalidResponse(msg) => ApplicationError::InvalidResponse(msg),
            other => ApplicationError::ExternalService(other.to_string()),
        }
    }
}

#[async_trait]
impl TokenRefreshPort for GmailTokenRefresher {
    #[instrument(skip(self, credential), fields(client_id = %credential.client_id()))]
    async fn refresh(&self, credential: &MailCredential) -> Result<AccessGrant, ApplicationError> {
        let refreshed = self
            .client
            .refresh(
                credential.token_uri(),
                credential.client_id(),
                credential.client_secret(),
                credential.refresh_token(),
            )
            .await
            .map_err(Self::map_error)?;

        let expires_at = refreshed.expires_at(Utc::now());
        Ok(AccessGrant {
            access_token: refreshed.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn unauthorized_send_is_auth() {
        let err = GmailError::from_api_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(
            GmailTransportAdapter::map_error(err),
            DeliveryError::Auth(_)
        ));
    }

    #[test]
    fn server_error_is_transient() {
        let err = GmailError::from_api_status(StatusCode::SERVICE_UNAVAILABLE, "backend error");
        assert!(matches!(
            GmailTransportAdapter::map_error(err),
            DeliveryError::Transient(_)
        ));
    }

    #[test]
    fn bad_request_is_permanent() {
        let err = GmailError::from_api_status(StatusCode::BAD_REQUEST, "Invalid To header");
        assert!(matches!(
            GmailTransportAdapter::map_error(err),
            DeliveryError::Permanent(_)
        ));
    }

    #[test]
    fn undecodable_send_response_is_permanent() {
        let err = GmailError::InvalidResponse("missing id".into());
        assert!(matches!(
            GmailTransportAdapter::map_error(err),
            DeliveryError::Permanent(_)
        ));
    }

    #[test]
    fn expired_grant_is_not_authorized() {
        let mapped = GmailTokenRefresher::map_error(GmailError::AuthExpired("invalid_grant".into()));
        let ApplicationError::NotAuthorized(detail) = mapped else {
            unreachable!("Expected NotAuthorized error");
        };
        assert!(detail.contains("invalid_grant"));
    }

    #[test]
    fn refresh_outage_is_external_service() {
        let mapped = GmailTokenRefresher::map_error(GmailError::ServerError {
            status: 502,
            message: "bad gateway".into(),
        });
        assert!(matches!(mapped, ApplicationError::ExternalService(_)));
    }
}
