//! Credential files written by Google's installed-app OAuth flow
//!
//! `token.json` carries the refresh token and the last access token;
//! `credentials.json` carries the OAuth client registration.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::GmailError;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Authorized-user token file
#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleToken {
    /// Last issued access token
    #[serde(default, alias = "access_token", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub scopes: Vec<String>,

    /// Access token expiry as an RFC 3339 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,

    #[serde(default, alias = "email", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universe_domain: Option<String>,
}

impl fmt::Debug for GoogleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleToken")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl GoogleToken {
    /// Parse a token file body
    pub fn from_json(json: &str) -> Result<Self, GmailError> {
        serde_json::from_str(json)
            .map_err(|e| GmailError::InvalidCredentials(format!("token file: {e}")))
    }

    pub fn to_json(&self) -> Result<String, GmailError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GmailError::InvalidCredentials(format!("token file: {e}")))
    }

    /// Refresh token, required for unattended runs
    pub fn refresh_secret(&self) -> Result<SecretString, GmailError> {
        self.refresh_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| SecretString::from(t.to_string()))
            .ok_or_else(|| GmailError::InvalidCredentials("token file has no refresh_token".into()))
    }

    /// Parsed access token expiry, `None` when absent or unparseable
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        self.expiry.as_deref().and_then(parse_expiry)
    }

    /// Record a newly issued access token
    pub fn record_refresh(&mut self, access_token: &str, expires_at: DateTime<Utc>) {
        self.token = Some(access_token.to_string());
        self.expiry = Some(expires_at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string());
    }
}

/// Parse the expiry formats seen in token files
///
/// Accepts RFC 3339 with or without offset (`2026-03-09T07:00:00.000000Z`,
/// `2026-03-09T07:00:00`), treating naive values as UTC.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// OAuth client registration
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthClientInfo {
    pub client_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for OAuthClientInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientInfo")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// `credentials.json` as downloaded from the Google Cloud console
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientSecretFile {
    Installed(OAuthClientInfo),
    Web(OAuthClientInfo),
}

impl ClientSecretFile {
    pub fn from_json(json: &str) -> Result<Self, GmailError> {
        serde_json::from_str(json)
            .map_err(|e| GmailError::InvalidCredentials(format!("client secret file: {e}")))
    }

    #[must_use]
    pub const fn client(&self) -> &OAuthClientInfo {
        match self {
            Self::Installed(info) | Self::Web(info) => info,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    const TOKEN_JSON: &str = r#"{
        "token": "ya29.a0AfB",
        "refresh_token": "1//0gRefresh",
        "token_uri": "https://oauth2.googleapis.com/token",
        "client_id": "123.apps.googleusercontent.com",
        "client_secret": "GOCSPX-secret",
        "scopes": ["https://www.googleapis.com/auth/gmail.send"],
        "universe_domain": "googleapis.com",
        "account": "",
        "expiry": "2026-03-09T07:15:42.123456Z"
    }"#;

    #[test]
    fn parses_authorized_user_file() {
        let token = GoogleToken::from_json(TOKEN_JSON).unwrap();
        assert_eq!(token.client_id, "123.apps.googleusercontent.com");
        assert_eq!(token.scopes.len(), 1);
        assert!(token.refresh_secret().is_ok());

        let expiry = token.expiry_time().unwrap();
        assert_eq!((expiry.month(), expiry.day(), expiry.hour()), (3, 9, 7));
    }

    #[test]
    fn access_token_alias_is_accepted() {
        let token = GoogleToken::from_json(
            r#"{"access_token": "ya29.x", "refresh_token": "1//r", "client_id": "c"}"#,
        )
        .unwrap();
        assert_eq!(token.token.as_deref(), Some("ya29.x"));
        assert_eq!(token.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn missing_refresh_token_is_invalid() {
        let token = GoogleToken::from_json(r#"{"token": "ya29.x", "client_id": "c"}"#).unwrap();
        assert!(matches!(
            token.refresh_secret(),
            Err(GmailError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn naive_expiry_is_utc() {
        let parsed = parse_expiry("2026-03-09T07:00:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-03-09T07:00:00+00:00");
        assert!(parse_expiry("next tuesday").is_none());
    }

    #[test]
    fn record_refresh_round_trips() {
        let mut token = GoogleToken::from_json(TOKEN_JSON).unwrap();
        let at = parse_expiry("2026-03-10T08:00:00Z").unwrap();
        token.record_refresh("ya29.new", at);

        let reparsed = GoogleToken::from_json(&token.to_json().unwrap()).unwrap();
        assert_eq!(reparsed.token.as_deref(), Some("ya29.new"));
        assert_eq!(reparsed.expiry_time(), Some(at));
        assert_eq!(reparsed.refresh_token.as_deref(), Some("1//0gRefresh"));
    }

    #[test]
    fn debug_hides_secrets() {
        let token = GoogleToken::from_json(TOKEN_JSON).unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("ya29"));
        assert!(!debug.contains("GOCSPX"));
    }

    #[test]
    fn client_secret_file_installed_and_web() {
        let installed = ClientSecretFile::from_json(
            r#"{"installed": {"client_id": "abc", "client_secret": "s", "auth_uri": "https://accounts.google.com/o/oauth2/auth", "redirect_uris": ["http://localhost"]}}"#,
        )
        .unwrap();
        assert_eq!(installed.client().client_id, "abc");
        assert_eq!(installed.client().token_uri, "https://oauth2.googleapis.com/token");

        let web = ClientSecretFile::from_json(r#"{"web": {"client_id": "w"}}"#).unwrap();
        assert!(web.client().client_secret.is_none());

        assert!(ClientSecretFile::from_json(r#"{"other": {}}"#).is_err());
    }
}
