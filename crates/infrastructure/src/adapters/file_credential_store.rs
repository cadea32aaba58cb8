//! File credential store - writes refreshed tokens back to `token.json`

use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use application::ports::CredentialStorePort;
use async_trait::async_trait;
use domain::MailCredential;
use integration_gmail::GoogleToken;
use secrecy::ExposeSecret;
use tokio::fs;
use tracing::{debug, instrument};

/// Persists the mail credential as an authorized-user token file
///
/// Fields the credential does not model (account, universe domain) are kept
/// from the existing file. The file is replaced atomically through a sibling
/// temp file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn existing_token(&self) -> Option<GoogleToken> {
        let body = fs::read_to_string(&self.path).await.ok()?;
        GoogleToken::from_json(&body).ok()
    }

    fn merge(base: Option<GoogleToken>, credential: &MailCredential) -> GoogleToken {
        let mut token = base.unwrap_or_else(|| GoogleToken {
            token: None,
            refresh_token: None,
            token_uri: credential.token_uri().to_string(),
            client_id: String::new(),
            client_secret: None,
            scopes: Vec::new(),
            expiry: None,
            account: None,
            universe_domain: None,
        });

        token.refresh_token = Some(credential.refresh_token().expose_secret().to_string());
        token.token_uri = credential.token_uri().to_string();
        token.client_id = credential.client_id().to_string();
        token.client_secret = credential
            .client_secret()
            .map(|s| s.expose_secret().to_string());
        if !credential.scopes().is_empty() {
            token.scopes = credential.scopes().to_vec();
        }
        if let (Some(access), Some(expiry)) = (credential.access_token(), credential.expires_at()) {
            token.record_refresh(access.expose_secret(), expiry);
        }
        token
    }
}

#[async_trait]
impl CredentialStorePort for FileCredentialStore {
    #[instrument(skip(self, credential), fields(path = %self.path.display()))]
    async fn persist(&self, credential: &MailCredential) -> Result<(), ApplicationError> {
        let token = Self::merge(self.existing_token().await, credential);
        let body = token
            .to_json()
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, body)
            .await
            .map_err(|e| ApplicationError::Internal(format!("Failed to write token file: {e}")))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ApplicationError::Internal(format!("Failed to replace token file: {e}")))?;

        debug!("Persisted refreshed credential");
        Ok(())
    }
}
