//! Credential manager - keeps the mail access token valid
//!
//! Holds the loaded [`MailCredential`] and refreshes it at most once per
//! `ensure_valid_token` call when it is missing or about to expire. A
//! refreshed credential is written back through the optional store; a failed
//! write is logged and otherwise ignored, since the token is still valid
//! for this run.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::MailCredential;
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{ApplicationError, DeliveryError};
use crate::ports::{CredentialProvider, CredentialStorePort, TokenRefreshPort};

pub struct CredentialManager {
    credential: Mutex<MailCredential>,
    refresher: Arc<dyn TokenRefreshPort>,
    store: Option<Arc<dyn CredentialStorePort>>,
}

impl fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialManager")
            .field("persists", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl CredentialManager {
    pub fn new(credential: MailCredential, refresher: Arc<dyn TokenRefreshPort>) -> Self {
        Self {
            credential: Mutex::new(credential),
            refresher,
            store: None,
        }
    }

    /// Write refreshed credentials back through `store`
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn CredentialStorePort>) -> Self {
        self.store = Some(store);
        self
    }

    /// Snapshot of the current credential
    pub async fn current(&self) -> MailCredential {
        self.credential.lock().await.clone()
    }
}

#[async_trait]
impl CredentialProvider for CredentialManager {
    #[instrument(skip(self))]
    async fn ensure_valid_token(&self) -> Result<SecretString, DeliveryError> {
        let mut credential = self.credential.lock().await;

        if !credential.needs_refresh(Utc::now()) {
            debug!("Access token still valid");
            if let Some(token) = credential.access_token() {
                return Ok(token.clone());
            }
        }

        info!(client_id = %credential.client_id(), "Refreshing mail access token");
        let grant = self
            .refresher
            .refresh(&credential)
            .await
            .map_err(|err| match err {
                ApplicationError::NotAuthorized(detail) => {
                    DeliveryError::Auth(format!("refresh rejected: {detail}"))
                },
                other => DeliveryError::Auth(format!("token refresh failed: {other}")),
            })?;

        let token = grant.access_token.clone();
        credential.apply_refresh(grant.access_token, grant.expires_at);
        info!(expires_at = %grant.expires_at, "Access token refreshed");

        if let Some(store) = &self.store {
            match store.persist(&credential).await {
                Ok(()) => debug!("Refreshed credential persisted"),
                Err(err) => warn!(error = %err, "Could not persist refreshed credential"),
            }
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::ports::{AccessGrant, MockCredentialStorePort, MockTokenRefreshPort};

    fn credential() -> MailCredential {
        MailCredential::new(
            SecretString::from("1//refresh"),
            "client-123.apps.googleusercontent.com",
            Some(SecretString::from("shh")),
            "",
        )
        .unwrap()
    }

    fn grant(token: &str) -> AccessGrant {
        AccessGrant {
            access_token: SecretString::from(token.to_string()),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn fresh_token_is_returned_without_refresh() {
        let mut refresher = MockTokenRefreshPort::new();
        refresher.expect_refresh().never();

        let cred = credential().with_access_token(
            SecretString::from("ya29.valid"),
            Some(Utc::now() + Duration::minutes(30)),
        );
        let manager = CredentialManager::new(cred, Arc::new(refresher));

        let token = manager.ensure_valid_token().await.unwrap();
        assert_eq!(token.expose_secret(), "ya29.valid");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_once() {
        let mut refresher = MockTokenRefreshPort::new();
        refresher
            .expect_refresh()
            .withf(|cred| cred.refresh_token().expose_secret() == "1//refresh")
            .times(1)
            .returning(|_| Ok(grant("ya29.new")));

        let cred = credential().with_access_token(
            SecretString::from("ya29.old"),
            Some(Utc::now() - Duration::minutes(5)),
        );
        let manager = CredentialManager::new(cred, Arc::new(refresher));

        let token = manager.ensure_valid_token().await.unwrap();
        assert_eq!(token.expose_secret(), "ya29.new");

        // Second call reuses the refreshed token
        let again = manager.ensure_valid_token().await.unwrap();
        assert_eq!(again.expose_secret(), "ya29.new");
    }

    #[tokio::test]
    async fn token_expiring_within_skew_is_refreshed() {
        let mut refresher = MockTokenRefreshPort::new();
        refresher
            .expect_refresh()
            .times(1)
            .returning(|_| Ok(grant("ya29.new")));

        let cred = credential().with_access_token(
            SecretString::from("ya29.almost"),
            Some(Utc::now() + Duration::seconds(20)),
        );
        let manager = CredentialManager::new(cred, Arc::new(refresher));

        assert_eq!(
            manager.ensure_valid_token().await.unwrap().expose_secret(),
            "ya29.new"
        );
    }

    #[tokio::test]
    async fn rejected_refresh_is_auth_error() {
        let mut refresher = MockTokenRefreshPort::new();
        refresher
            .expect_refresh()
            .times(1)
            .returning(|_| Err(ApplicationError::NotAuthorized("invalid_grant".into())));

        let manager = CredentialManager::new(credential(), Arc::new(refresher));
        let err = manager.ensure_valid_token().await.unwrap_err();

        assert!(matches!(err, DeliveryError::Auth(ref detail) if detail.contains("invalid_grant")));
    }

    #[tokio::test]
    async fn unreachable_token_endpoint_is_auth_error() {
        let mut refresher = MockTokenRefreshPort::new();
        refresher
            .expect_refresh()
            .times(1)
            .returning(|_| Err(ApplicationError::ExternalService("connection reset".into())));

        let manager = CredentialManager::new(credential(), Arc::new(refresher));
        assert!(matches!(
            manager.ensure_valid_token().await,
            Err(DeliveryError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn refreshed_credential_is_persisted() {
        let mut refresher = MockTokenRefreshPort::new();
        refresher
            .expect_refresh()
            .returning(|_| Ok(grant("ya29.new")));
        let mut store = MockCredentialStorePort::new();
        store
            .expect_persist()
            .withf(|cred| {
                cred.access_token()
                    .is_some_and(|t| t.expose_secret() == "ya29.new")
            })
            .times(1)
            .returning(|_| Ok(()));

        let manager =
            CredentialManager::new(credential(), Arc::new(refresher)).with_store(Arc::new(store));

        manager.ensure_valid_token().await.unwrap();
        assert!(manager.current().await.expires_at().is_some());
    }

    #[tokio::test]
    async fn persist_failure_does_not_fail_the_call() {
        let mut refresher = MockTokenRefreshPort::new();
        refresher
            .expect_refresh()
            .returning(|_| Ok(grant("ya29.new")));
        let mut store = MockCredentialStorePort::new();
        store
            .expect_persist()
            .returning(|_| Err(ApplicationError::Internal("read-only filesystem".into())));

        let manager =
            CredentialManager::new(credential(), Arc::new(refresher)).with_store(Arc::new(store));

        assert!(manager.ensure_valid_token().await.is_ok());
    }
}
