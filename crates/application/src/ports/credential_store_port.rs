//! Credential store port - write a refreshed credential back to its source

use async_trait::async_trait;
use domain::MailCredential;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialStorePort: Send + Sync {
    async fn persist(&self, credential: &MailCredential) -> Result<(), ApplicationError>;
}
