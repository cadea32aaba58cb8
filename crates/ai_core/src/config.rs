//! Configuration for the Anthropic client

use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Anthropic Messages API settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API base URL, without the `/v1/messages` path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (sensitive)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens per model turn
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP timeout per request in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Value of the `anthropic-version` header
    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_timeout_secs() -> u64 {
    120
}

fn default_anthropic_version() -> String {
    "2023-06-01".to_string()
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            anthropic_version: default_anthropic_version(),
        }
    }
}

impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl AnthropicConfig {
    /// Config with the given key and defaults for everything else
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the messages endpoint
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}
