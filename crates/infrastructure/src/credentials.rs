//! Mail credential loading
//!
//! The token and client-secret documents come either from files or from
//! base64 values, the form CI secret stores hand out. The token document
//! normally carries `client_id` and `client_secret` itself; the client-secret
//! document only fills what the token lacks.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use domain::MailCredential;
use integration_gmail::{ClientSecretFile, GoogleToken};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::config::{ConfigError, MailConfig};

/// Read and merge the configured credential documents
pub fn load_mail_credential(config: &MailConfig) -> Result<MailCredential, ConfigError> {
    let token = load_token(config)?;
    let client = load_client_secret(config)?;
    build_credential(&token, client.as_ref())
}

/// Parse the token document from `token_path`, falling back to `token_json_b64`
pub fn load_token(config: &MailConfig) -> Result<GoogleToken, ConfigError> {
    let json = match (&config.token_path, &config.token_json_b64) {
        (Some(path), _) if path.exists() => read_file(path)?,
        (_, Some(encoded)) => decode_b64("mail.token_json_b64", encoded)?,
        (Some(path), None) => {
            return Err(ConfigError::Credential(format!(
                "token file {} does not exist",
                path.display()
            )));
        },
        (None, None) => {
            return Err(ConfigError::Credential("no mail token configured".into()));
        },
    };
    GoogleToken::from_json(&json).map_err(|e| ConfigError::Credential(e.to_string()))
}

fn load_client_secret(config: &MailConfig) -> Result<Option<ClientSecretFile>, ConfigError> {
    let json = match (&config.client_secret_path, &config.client_secret_json_b64) {
        (Some(path), _) if path.exists() => read_file(path)?,
        (_, Some(encoded)) => decode_b64("mail.client_secret_json_b64", encoded)?,
        (Some(path), None) => {
            return Err(ConfigError::Credential(format!(
                "client secret file {} does not exist",
                path.display()
            )));
        },
        (None, None) => return Ok(None),
    };
    ClientSecretFile::from_json(&json)
        .map(Some)
        .map_err(|e| ConfigError::Credential(e.to_string()))
}

fn build_credential(
    token: &GoogleToken,
    client: Option<&ClientSecretFile>,
) -> Result<MailCredential, ConfigError> {
    let refresh_token = token
        .refresh_secret()
        .map_err(|e| ConfigError::Credential(e.to_string()))?;

    let client_info = client.map(ClientSecretFile::client);
    let client_id = if token.client_id.trim().is_empty() {
        client_info.map(|c| c.client_id.clone()).unwrap_or_default()
    } else {
        token.client_id.clone()
    };
    let client_secret = token
        .client_secret
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| client_info.and_then(|c| c.client_secret.clone()))
        .map(SecretString::from);
    let token_uri = if token.token_uri.trim().is_empty() {
        client_info.map(|c| c.token_uri.clone()).unwrap_or_default()
    } else {
        token.token_uri.clone()
    };

    let mut credential = MailCredential::new(refresh_token, client_id, client_secret, token_uri)
        .map_err(|e| ConfigError::Credential(e.to_string()))?
        .with_scopes(token.scopes.clone());

    if let Some(access) = token.token.as_deref().filter(|t| !t.is_empty()) {
        credential =
            credential.with_access_token(SecretString::from(access.to_string()), token.expiry_time());
    }

    info!(
        client_id = %credential.client_id(),
        has_access_token = credential.access_token().is_some(),
        "Mail credential loaded"
    );
    Ok(credential)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    debug!(path = %path.display(), "Reading credential file");
    std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Credential(format!("{}: {e}", path.display())))
}

/// Decode a base64 document; standard and URL-safe alphabets are accepted
fn decode_b64(field: &str, encoded: &SecretString) -> Result<String, ConfigError> {
    let compact: String = encoded
        .expose_secret()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(&compact)
        .or_else(|_| URL_SAFE.decode(&compact))
        .map_err(|e| ConfigError::Credential(format!("{field} is not valid base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ConfigError::Credential(format!("{field} is not UTF-8 JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::{TimeZone, Utc};

    use super::*;

    const TOKEN: &str = r#"{
        "token": "ya29.cached",
        "refresh_token": "1//refresh",
        "token_uri": "https://oauth2.googleapis.com/token",
        "client_id": "client-from-token",
        "client_secret": "secret-from-token",
        "scopes": ["https://www.googleapis.com/auth/gmail.send"],
        "expiry": "2026-03-09T07:00:00.000000Z"
    }"#;

    const BARE_TOKEN: &str = r#"{"refresh_token": "1//refresh"}"#;

    const CLIENT: &str = r#"{"installed": {"client_id": "client-from-file", "client_secret": "secret-from-file", "token_uri": "https://oauth2.example.test/token"}}"#;

    fn file_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn token_file_is_self_sufficient() {
        let token = file_with(TOKEN);
        let config = MailConfig {
            token_path: Some(token.path().to_path_buf()),
            ..MailConfig::default()
        };

        let credential = load_mail_credential(&config).unwrap();
        assert_eq!(credential.client_id(), "client-from-token");
        assert_eq!(credential.refresh_token().expose_secret(), "1//refresh");
        assert_eq!(
            credential.expires_at(),
            Some(Utc.with_ymd_and_hms(2026, 3, 9, 7, 0, 0).unwrap())
        );
        assert_eq!(credential.scopes().len(), 1);
    }

    #[test]
    fn base64_values_are_decoded() {
        let config = MailConfig {
            token_json_b64: Some(SecretString::from(STANDARD.encode(BARE_TOKEN))),
            client_secret_json_b64: Some(SecretString::from(STANDARD.encode(CLIENT))),
            ..MailConfig::default()
        };

        let credential = load_mail_credential(&config).unwrap();
        assert_eq!(credential.client_id(), "client-from-file");
        assert_eq!(
            credential.client_secret().map(|s| s.expose_secret()),
            Some("secret-from-file")
        );
        assert!(credential.access_token().is_none());
        assert!(credential.needs_refresh(Utc::now()));
    }

    #[test]
    fn token_fields_win_over_client_file() {
        let token = file_with(TOKEN);
        let client = file_with(CLIENT);
        let config = MailConfig {
            token_path: Some(token.path().to_path_buf()),
            client_secret_path: Some(client.path().to_path_buf()),
            ..MailConfig::default()
        };

        let credential = load_mail_credential(&config).unwrap();
        assert_eq!(credential.client_id(), "client-from-token");
        assert_eq!(credential.token_uri(), "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn missing_token_path_falls_back_to_base64() {
        let config = MailConfig {
            token_path: Some("/nonexistent/token.json".into()),
            token_json_b64: Some(SecretString::from(STANDARD.encode(TOKEN))),
            ..MailConfig::default()
        };
        assert!(load_mail_credential(&config).is_ok());
    }

    #[test]
    fn missing_client_id_is_a_credential_error() {
        let config = MailConfig {
            token_json_b64: Some(SecretString::from(STANDARD.encode(BARE_TOKEN))),
            ..MailConfig::default()
        };
        assert!(matches!(
            load_mail_credential(&config),
            Err(ConfigError::Credential(_))
        ));
    }

    #[test]
    fn garbage_base64_is_a_credential_error() {
        let config = MailConfig {
            token_json_b64: Some(SecretString::from("%%% not base64 %%%")),
            ..MailConfig::default()
        };
        let err = load_mail_credential(&config).unwrap_err();
        assert!(err.to_string().contains("not valid base64"));
    }

    #[test]
    fn token_without_refresh_token_is_rejected() {
        let config = MailConfig {
            token_json_b64: Some(SecretString::from(
                STANDARD.encode(r#"{"token": "ya29.x", "client_id": "c"}"#),
            )),
            ..MailConfig::default()
        };
        let err = load_mail_credential(&config).unwrap_err();
        assert!(err.to_string().contains("refresh_token"));
    }
}
