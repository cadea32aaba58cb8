//! Mail dispatcher - deliver a rendered email to one recipient
//!
//! Obtains a valid access token, then submits the message with bounded
//! retry on transient failures. The outcome is always a [`DeliveryReceipt`];
//! this service never returns an error.

use std::fmt;
use std::sync::Arc;

use domain::{DeliveryReceipt, EmailAddress, RenderedEmail};
use tracing::{error, info, instrument};

use crate::ports::{CredentialProvider, MailTransportPort, OutgoingMail};
use crate::retry::{RetryConfig, with_retry};

pub struct MailDispatcher {
    transport: Arc<dyn MailTransportPort>,
    sender: Option<EmailAddress>,
    retry: RetryConfig,
}

impl fmt::Debug for MailDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailDispatcher")
            .field("sender", &self.sender)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransportPort>) -> Self {
        Self {
            transport,
            sender: None,
            retry: RetryConfig::mail_delivery(),
        }
    }

    /// Use a fixed From address instead of the recipient's own
    #[must_use]
    pub fn with_sender(mut self, sender: Option<EmailAddress>) -> Self {
        self.sender = sender;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Deliver `email` to `recipient`
    ///
    /// A credential failure yields an auth receipt with zero attempts and no
    /// send. Transient send failures are retried up to the configured
    /// attempt count; auth and permanent failures are not.
    #[instrument(skip(self, email, credentials), fields(recipient = %recipient))]
    pub async fn send(
        &self,
        email: &RenderedEmail,
        recipient: &EmailAddress,
        credentials: &dyn CredentialProvider,
    ) -> DeliveryReceipt {
        let access_token = match credentials.ensure_valid_token().await {
            Ok(token) => token,
            Err(err) => {
                error!(error = %err, "No usable mail credential, skipping send");
                return DeliveryReceipt::failed(recipient.clone(), err.kind(), err.detail(), 0);
            },
        };

        let from = self.sender.clone().unwrap_or_else(|| recipient.clone());
        let mail = OutgoingMail::from_rendered(from, recipient.clone(), email);
        let transport = self.transport.as_ref();
        let token = &access_token;
        let mail_ref = &mail;

        let outcome = with_retry(&self.retry, move || transport.send(token, mail_ref)).await;
        let attempts = outcome.attempts;

        match outcome.into_result() {
            Ok(message_id) => {
                info!(%message_id, attempts, "Email delivered");
                DeliveryReceipt::delivered(recipient.clone(), message_id, attempts)
            },
            Err(err) => {
                error!(kind = %err.kind(), attempts, error = %err, "Email delivery failed");
                DeliveryReceipt::failed(recipient.clone(), err.kind(), err.detail(), attempts)
            },
        }
    }
}
