//! Mail transport port - submit one message to the provider

use async_trait::async_trait;
use domain::{EmailAddress, RenderedEmail};
#[cfg(test)]
use mockall::automock;
use secrecy::SecretString;

use crate::error::DeliveryError;

/// A single-recipient message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: EmailAddress,
    pub to: EmailAddress,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl OutgoingMail {
    pub fn from_rendered(from: EmailAddress, to: EmailAddress, email: &RenderedEmail) -> Self {
        Self {
            from,
            to,
            subject: email.subject.clone(),
            html_body: email.html_body.clone(),
            text_body: email.text_body.clone(),
        }
    }
}

/// Port for the mail provider's send operation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailTransportPort: Send + Sync {
    /// Submit the message, returning the provider message id
    ///
    /// Errors are already classified: a refused token is
    /// [`DeliveryError::Auth`], network and 5xx/429 failures are
    /// [`DeliveryError::Transient`], everything else is
    /// [`DeliveryError::Permanent`].
    async fn send(
        &self,
        access_token: &SecretString,
        mail: &OutgoingMail,
    ) -> Result<String, DeliveryError>;
}
