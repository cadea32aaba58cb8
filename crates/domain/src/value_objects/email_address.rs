//! Validated mailbox address for the briefing recipient and sender
//!
//! ```
//! use domain::EmailAddress;
//!
//! let recipient = EmailAddress::new(" Reader@Example.COM ").unwrap();
//! assert_eq!(recipient.as_str(), "reader@example.com");
//! assert!(EmailAddress::new("not-an-address").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::DomainError;

/// A validated, normalized email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress {
    #[validate(email)]
    value: String,
}

impl EmailAddress {
    /// Validate and normalize (trim, lowercase) an address
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidEmailAddress`] if the format is invalid.
    pub fn new(email: impl Into<String>) -> Result<Self, DomainError> {
        let candidate = Self {
            value: email.into().trim().to_lowercase(),
        };
        candidate
            .validate()
            .map_err(|e| DomainError::InvalidEmailAddress(e.to_string()))?;
        Ok(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The part after `@`
    pub fn domain(&self) -> &str {
        self.value.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(address: EmailAddress) -> Self {
        address.value
    }
}
