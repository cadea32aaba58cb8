//! Gmail client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    /// Gmail REST API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Request timeout in seconds, for both send and token refresh
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://gmail.googleapis.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GmailConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// URL of `users.messages.send` for the authenticated user
    pub fn send_url(&self) -> String {
        format!(
            "{}/gmail/v1/users/me/messages/send",
            self.api_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_send_url() {
        assert_eq!(
            GmailConfig::default().send_url(),
            "https://gmail.googleapis.com/gmail/v1/users/me/messages/send"
        );
    }

    #[test]
    fn custom_base_url_without_trailing_slash() {
        let config = GmailConfig {
            api_base_url: "http://127.0.0.1:8080/".into(),
            ..GmailConfig::default()
        };
        assert_eq!(
            config.send_url(),
            "http://127.0.0.1:8080/gmail/v1/users/me/messages/send"
        );
    }
}
