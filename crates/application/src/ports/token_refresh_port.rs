//! Token refresh port - exchange a refresh token for an access token

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::MailCredential;
#[cfg(test)]
use mockall::automock;
use secrecy::SecretString;

use crate::error::ApplicationError;

/// A newly issued access token
#[derive(Debug)]
pub struct AccessGrant {
    pub access_token: SecretString,
    pub expires_at: DateTime<Utc>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenRefreshPort: Send + Sync {
    async fn refresh(&self, credential: &MailCredential) -> Result<AccessGrant, ApplicationError>;
}
