//! Web search configuration

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Brave time filters accepted by the `freshness` parameter
const FRESHNESS_PRESETS: [&str; 4] = ["pd", "pw", "pm", "py"];

/// Configuration for the Brave Search client
#[derive(Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Brave Search API key (sensitive)
    #[serde(default, skip_serializing)]
    pub brave_api_key: Option<SecretString>,

    /// Brave Search API base URL
    #[serde(default = "default_brave_base_url")]
    pub brave_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on results per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Recency filter: `pd`, `pw`, `pm`, `py` or `YYYY-MM-DDtoYYYY-MM-DD`.
    /// `None` disables the filter.
    #[serde(default = "default_freshness")]
    pub freshness: Option<String>,

    /// Safe search level: "off", "moderate", "strict"
    #[serde(default = "default_safe_search")]
    pub safe_search: String,

    /// Preferred result country (ISO 3166-1 alpha-2)
    #[serde(default = "default_result_country")]
    pub result_country: String,

    /// Preferred result language (ISO 639-1)
    #[serde(default = "default_result_language")]
    pub result_language: String,
}

fn default_brave_base_url() -> String {
    "https://api.search.brave.com/res/v1".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

const fn default_max_results() -> usize {
    5
}

#[allow(clippy::unnecessary_wraps)]
fn default_freshness() -> Option<String> {
    Some("pw".to_string())
}

fn default_safe_search() -> String {
    "moderate".to_string()
}

fn default_result_country() -> String {
    "US".to_string()
}

fn default_result_language() -> String {
    "en".to_string()
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            brave_api_key: None,
            brave_base_url: default_brave_base_url(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            freshness: default_freshness(),
            safe_search: default_safe_search(),
            result_country: default_result_country(),
            result_language: default_result_language(),
        }
    }
}

impl fmt::Debug for WebSearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSearchConfig")
            .field(
                "brave_api_key",
                &self.brave_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("brave_base_url", &self.brave_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_results", &self.max_results)
            .field("freshness", &self.freshness)
            .finish_non_exhaustive()
    }
}

impl WebSearchConfig {
    /// Create a configuration for testing (dummy key, short timeout)
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            brave_api_key: Some(SecretString::from("test-api-key")),
            brave_base_url: base_url.into(),
            timeout_secs: 2,
            max_results: 3,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_results == 0 {
            return Err("max_results must be greater than 0".to_string());
        }

        if self.max_results > 20 {
            return Err("max_results must be 20 or less".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        let valid_safe_search = ["off", "moderate", "strict"];
        if !valid_safe_search.contains(&self.safe_search.as_str()) {
            return Err(format!(
                "safe_search must be one of: {}",
                valid_safe_search.join(", ")
            ));
        }

        if let Some(freshness) = self.freshness.as_deref().filter(|f| !is_valid_freshness(f)) {
            return Err(format!(
                "freshness must be one of {} or a YYYY-MM-DDtoYYYY-MM-DD range, got '{freshness}'",
                FRESHNESS_PRESETS.join(", ")
            ));
        }

        Ok(())
    }
}

fn is_valid_freshness(value: &str) -> bool {
    if FRESHNESS_PRESETS.contains(&value) {
        return true;
    }
    value.split_once("to").is_some_and(|(from, to)| {
        [from, to].iter().all(|date| {
            date.len() == 10
                && date
                    .chars()
                    .enumerate()
                    .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WebSearchConfig::default();
        assert!(config.brave_api_key.is_none());
        assert_eq!(config.max_results, 5);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.freshness.as_deref(), Some("pw"));
        assert_eq!(config.safe_search, "moderate");
    }

    #[test]
    fn test_validation_success() {
        assert!(WebSearchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_max_results() {
        let config = WebSearchConfig {
            max_results: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WebSearchConfig {
            max_results: 21,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let config = WebSearchConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_freshness_values() {
        assert!(is_valid_freshness("pm"));
        assert!(is_valid_freshness("2026-03-02to2026-03-08"));
        assert!(!is_valid_freshness("week"));
        assert!(!is_valid_freshness("2026-3-2to2026-3-8"));

        let config = WebSearchConfig {
            freshness: None,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = WebSearchConfig::for_testing("http://localhost");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("test-api-key"));
        assert!(!format!("{config:?}").contains("test-api-key"));
    }
}
