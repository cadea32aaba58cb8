use thiserror::Error;

/// Rejections raised while constructing domain values
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// A report window whose end precedes its start
    #[error("Invalid report window: {0}")]
    InvalidWindow(String),

    #[error("Unknown briefing profile '{0}' (expected weekly or coaching)")]
    UnknownProfile(String),

    /// Refresh token or client id missing from a mail credential
    #[error("Invalid mail credential: {0}")]
    InvalidCredential(String),

    /// Any other broken invariant, e.g. an empty prompt or document
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_helper_builds_validation_error() {
        let err = DomainError::validation("generated document is empty");
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert_eq!(err.to_string(), "Validation failed: generated document is empty");
    }

    #[test]
    fn unknown_profile_names_the_choices() {
        let err = DomainError::UnknownProfile("monthly".into());
        assert_eq!(
            err.to_string(),
            "Unknown briefing profile 'monthly' (expected weekly or coaching)"
        );
    }
}
