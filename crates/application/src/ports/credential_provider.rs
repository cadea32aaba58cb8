//! Credential provider - the capability the mail dispatcher consumes

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use secrecy::SecretString;

use crate::error::DeliveryError;

/// Hands out an access token that is valid right now
///
/// Refreshing an expired token happens inside this call, so callers never
/// manage token lifecycle themselves.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// # Errors
    ///
    /// Any failure to produce a usable token is [`DeliveryError::Auth`].
    async fn ensure_valid_token(&self) -> Result<SecretString, DeliveryError>;
}
