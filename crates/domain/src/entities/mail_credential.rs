//! OAuth credential for the mail provider
//!
//! Holds a long-lived refresh token and an optional short-lived access token.
//! All secrets are wrapped in [`SecretString`] so `Debug` output is redacted.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::errors::DomainError;

/// Access tokens this close to expiry are treated as expired
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Default Google OAuth token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refreshable mail credential
#[derive(Debug)]
pub struct MailCredential {
    refresh_token: SecretString,
    access_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
    client_id: String,
    client_secret: Option<SecretString>,
    token_uri: String,
    scopes: Vec<String>,
}

impl MailCredential {
    /// # Errors
    ///
    /// Fails when the refresh token or client id is blank.
    pub fn new(
        refresh_token: SecretString,
        client_id: impl Into<String>,
        client_secret: Option<SecretString>,
        token_uri: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if refresh_token.expose_secret().trim().is_empty() {
            return Err(DomainError::InvalidCredential(
                "refresh token is empty".to_string(),
            ));
        }
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(DomainError::InvalidCredential(
                "OAuth client id is empty".to_string(),
            ));
        }
        let token_uri = token_uri.into();
        Ok(Self {
            refresh_token,
            access_token: None,
            expires_at: None,
            client_id,
            client_secret,
            token_uri: if token_uri.trim().is_empty() {
                DEFAULT_TOKEN_URI.to_string()
            } else {
                token_uri
            },
            scopes: Vec::new(),
        })
    }

    /// Seed with a previously issued access token
    #[must_use]
    pub fn with_access_token(
        mut self,
        access_token: SecretString,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        if !access_token.expose_secret().is_empty() {
            self.access_token = Some(access_token);
            self.expires_at = expires_at;
        }
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// True when there is no access token, no known expiry, or the expiry
    /// falls within [`EXPIRY_SKEW_SECS`] of `now`
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expiry)) => expiry <= now + Duration::seconds(EXPIRY_SKEW_SECS),
            _ => true,
        }
    }

    /// Install a freshly granted access token
    pub fn apply_refresh(&mut self, access_token: SecretString, expires_at: DateTime<Utc>) {
        self.access_token = Some(access_token);
        self.expires_at = Some(expires_at);
    }

    pub fn refresh_token(&self) -> &SecretString {
        &self.refresh_token
    }

    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&SecretString> {
        self.client_secret.as_ref()
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

impl Clone for MailCredential {
    fn clone(&self) -> Self {
        Self {
            refresh_token: copy_secret(&self.refresh_token),
            access_token: self.access_token.as_ref().map(copy_secret),
            expires_at: self.expires_at,
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.as_ref().map(copy_secret),
            token_uri: self.token_uri.clone(),
            scopes: self.scopes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    fn credential() -> MailCredential {
        MailCredential::new(secret("1//refresh"), "client.apps.example", None, "").unwrap()
    }

    #[test]
    fn blank_refresh_token_is_rejected() {
        let result = MailCredential::new(secret("  "), "client", None, DEFAULT_TOKEN_URI);
        assert!(matches!(result, Err(DomainError::InvalidCredential(_))));
    }

    #[test]
    fn blank_client_id_is_rejected() {
        let result = MailCredential::new(secret("1//refresh"), "", None, DEFAULT_TOKEN_URI);
        assert!(result.is_err());
    }

    #[test]
    fn empty_token_uri_falls_back_to_google() {
        assert_eq!(credential().token_uri(), DEFAULT_TOKEN_URI);
    }

    #[test]
    fn missing_access_token_needs_refresh() {
        assert!(credential().needs_refresh(Utc::now()));
    }

    #[test]
    fn access_token_without_expiry_needs_refresh() {
        let cred = credential().with_access_token(secret("ya29.token"), None);
        assert!(cred.needs_refresh(Utc::now()));
    }

    #[test]
    fn fresh_token_does_not_need_refresh() {
        let now = Utc::now();
        let cred =
            credential().with_access_token(secret("ya29.token"), Some(now + Duration::hours(1)));
        assert!(!cred.needs_refresh(now));
    }

    #[test]
    fn token_inside_skew_window_needs_refresh() {
        let now = Utc::now();
        let cred = credential()
            .with_access_token(secret("ya29.token"), Some(now + Duration::seconds(30)));
        assert!(cred.needs_refresh(now));
    }

    #[test]
    fn apply_refresh_installs_new_token() {
        let now = Utc::now();
        let mut cred = credential();
        cred.apply_refresh(secret("ya29.new"), now + Duration::hours(1));
        assert!(!cred.needs_refresh(now));
        assert_eq!(cred.access_token().unwrap().expose_secret(), "ya29.new");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cred = credential().with_access_token(secret("ya29.visible?"), None);
        let debug = format!("{cred:?}");
        assert!(!debug.contains("1//refresh"));
        assert!(!debug.contains("ya29.visible?"));
        assert!(debug.contains("client.apps.example"));
    }

    #[test]
    fn clone_copies_secrets() {
        let cred = credential().with_access_token(secret("ya29.a"), None);
        let copy = cred.clone();
        assert_eq!(copy.refresh_token().expose_secret(), "1//refresh");
        assert_eq!(copy.access_token().unwrap().expose_secret(), "ya29.a");
    }
}
