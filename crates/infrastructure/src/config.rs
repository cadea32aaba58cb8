//! Application configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. `config.toml` in the working directory, or the file passed explicitly
//! 3. `WEEKLY_BRIEF__SECTION__KEY` environment variables
//! 4. The plain variable names used by existing deployments
//!    (`ANTHROPIC_API_KEY`, `RECIPIENT_EMAIL`, `GMAIL_TOKEN_JSON_B64`, ...)

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ai_core::AnthropicConfig;
use application::{GeneratorSettings, RetryConfig};
use chrono_tz::Tz;
use domain::{BriefingProfile, EmailAddress, MAX_SEARCH_BUDGET};
use integration_gmail::GmailConfig;
use integration_websearch::WebSearchConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ENV_PREFIX: &str = "WEEKLY_BRIEF";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Mail credential could not be loaded: {0}")]
    Credential(String),
}

/// Text service and tool-use loop settings
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Web searches allowed per weekly run
    #[serde(default = "default_search_budget")]
    pub search_budget: u32,

    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,

    /// Attempts per model turn, the first included
    #[serde(default = "default_turn_attempts")]
    pub turn_attempts: u32,
}

fn default_generation_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_search_budget() -> u32 {
    15
}

const fn default_max_turns() -> u32 {
    20
}

const fn default_turn_timeout_secs() -> u64 {
    120
}

const fn default_turn_attempts() -> u32 {
    2
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            search_budget: default_search_budget(),
            max_turns: default_max_turns(),
            turn_timeout_secs: default_turn_timeout_secs(),
            turn_attempts: default_turn_attempts(),
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("search_budget", &self.search_budget)
            .field("max_turns", &self.max_turns)
            .field("turn_timeout_secs", &self.turn_timeout_secs)
            .field("turn_attempts", &self.turn_attempts)
            .finish()
    }
}

impl GenerationConfig {
    pub fn anthropic_config(&self) -> AnthropicConfig {
        AnthropicConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout_secs: self.turn_timeout_secs,
            ..AnthropicConfig::default()
        }
    }

    pub fn generator_settings(&self, results_per_search: usize) -> GeneratorSettings {
        GeneratorSettings {
            max_turns: self.max_turns,
            turn_timeout: Duration::from_secs(self.turn_timeout_secs),
            turn_retry: RetryConfig::model_turns().with_max_attempts(self.turn_attempts),
            results_per_search,
        }
    }
}

/// Recipient, sender and Gmail credential sources
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub recipient_email: Option<String>,

    /// From address; the recipient sends to themselves when unset
    #[serde(default)]
    pub sender_email: Option<String>,

    #[serde(default)]
    pub token_path: Option<PathBuf>,

    #[serde(default, skip_serializing)]
    pub token_json_b64: Option<SecretString>,

    #[serde(default)]
    pub client_secret_path: Option<PathBuf>,

    #[serde(default, skip_serializing)]
    pub client_secret_json_b64: Option<SecretString>,

    /// Send attempts, the first included
    #[serde(default = "default_mail_attempts")]
    pub max_attempts: u32,

    /// Write refreshed access tokens back to `token_path`
    #[serde(default = "default_true")]
    pub persist_refreshed_token: bool,

    #[serde(default = "default_gmail_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_mail_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_mail_attempts() -> u32 {
    3
}

const fn default_true() -> bool {
    true
}

fn default_gmail_base_url() -> String {
    GmailConfig::default().api_base_url
}

const fn default_mail_timeout_secs() -> u64 {
    30
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            recipient_email: None,
            sender_email: None,
            token_path: None,
            token_json_b64: None,
            client_secret_path: None,
            client_secret_json_b64: None,
            max_attempts: default_mail_attempts(),
            persist_refreshed_token: true,
            api_base_url: default_gmail_base_url(),
            timeout_secs: default_mail_timeout_secs(),
        }
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("recipient_email", &self.recipient_email)
            .field("sender_email", &self.sender_email)
            .field("token_path", &self.token_path)
            .field("token_json_b64", &self.token_json_b64.as_ref().map(|_| "[REDACTED]"))
            .field("client_secret_path", &self.client_secret_path)
            .field(
                "client_secret_json_b64",
                &self.client_secret_json_b64.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_attempts", &self.max_attempts)
            .field("persist_refreshed_token", &self.persist_refreshed_token)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

impl MailConfig {
    pub fn gmail_config(&self) -> GmailConfig {
        GmailConfig {
            api_base_url: self.api_base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn recipient(&self) -> Result<EmailAddress, ConfigError> {
        let raw = self
            .recipient_email
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::Invalid("mail.recipient_email is required".into()))?;
        EmailAddress::new(raw)
            .map_err(|e| ConfigError::Invalid(format!("mail.recipient_email: {e}")))
    }

    pub fn sender(&self) -> Result<Option<EmailAddress>, ConfigError> {
        self.sender_email
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(|raw| {
                EmailAddress::new(raw)
                    .map_err(|e| ConfigError::Invalid(format!("mail.sender_email: {e}")))
            })
            .transpose()
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig::mail_delivery().with_max_attempts(self.max_attempts)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// IANA zone used to date the subject line
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Replaces the profile's default subject prefix
    #[serde(default)]
    pub subject_prefix: Option<String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            subject_prefix: None,
        }
    }
}

impl RenderConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("render.timezone: unknown zone '{}'", self.timezone)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,

    #[serde(default)]
    pub json: bool,

    /// Also append log lines to this file, e.g. `newsletter.log` next to
    /// the scheduled task
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub websearch: WebSearchConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the optional file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let mut config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.apply_well_known_env(|name| std::env::var(name).ok());
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Apply the variable names of existing deployments
    ///
    /// Blank values are ignored so an empty CI secret does not wipe a value
    /// from the config file.
    pub fn apply_well_known_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = var("ANTHROPIC_API_KEY") {
            self.generation.api_key = Some(SecretString::from(key));
        }
        if let Some(key) = var("BRAVE_API_KEY") {
            self.websearch.brave_api_key = Some(SecretString::from(key));
        }
        if let Some(path) = var("LOG_FILE") {
            self.logging.file = Some(PathBuf::from(path));
        }
        if let Some(recipient) = var("RECIPIENT_EMAIL") {
            self.mail.recipient_email = Some(recipient);
        }
        if let Some(path) = var("GMAIL_TOKEN_PATH") {
            self.mail.token_path = Some(PathBuf::from(path));
        }
        if let Some(encoded) = var("GMAIL_TOKEN_JSON_B64") {
            self.mail.token_json_b64 = Some(SecretString::from(encoded));
        }
        if let Some(path) = var("GMAIL_CLIENT_SECRET_PATH") {
            self.mail.client_secret_path = Some(PathBuf::from(path));
        }
        if let Some(encoded) = var("GMAIL_CLIENT_SECRET_JSON_B64") {
            self.mail.client_secret_json_b64 = Some(SecretString::from(encoded));
        }
    }

    /// Check everything a run of `profile` needs before any network call
    pub fn validate(&self, profile: BriefingProfile) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if !has_secret(generation.api_key.as_ref()) {
            return Err(ConfigError::Invalid(
                "generation.api_key is required (ANTHROPIC_API_KEY)".into(),
            ));
        }
        if generation.search_budget > MAX_SEARCH_BUDGET {
            return Err(ConfigError::Invalid(format!(
                "generation.search_budget must be at most {MAX_SEARCH_BUDGET}, got {}",
                generation.search_budget
            )));
        }
        if generation.max_turns == 0 {
            return Err(ConfigError::Invalid("generation.max_turns must be at least 1".into()));
        }
        if generation.turn_attempts == 0 {
            return Err(ConfigError::Invalid(
                "generation.turn_attempts must be at least 1".into(),
            ));
        }
        if generation.turn_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "generation.turn_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.uses_search(profile) {
            if !has_secret(self.websearch.brave_api_key.as_ref()) {
                return Err(ConfigError::Invalid(
                    "websearch.brave_api_key is required when the search budget is above 0 (BRAVE_API_KEY)"
                        .into(),
                ));
            }
            self.websearch
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("websearch: {e}")))?;
        }

        self.mail.recipient()?;
        self.mail.sender()?;
        if self.mail.token_path.is_none() && !has_secret(self.mail.token_json_b64.as_ref()) {
            return Err(ConfigError::Invalid(
                "a mail token is required: set mail.token_path (GMAIL_TOKEN_PATH) or mail.token_json_b64 (GMAIL_TOKEN_JSON_B64)"
                    .into(),
            ));
        }
        if self.mail.max_attempts == 0 {
            return Err(ConfigError::Invalid("mail.max_attempts must be at least 1".into()));
        }

        self.render.tz()?;
        Ok(())
    }

    /// Search budget for a run of `profile`
    pub const fn search_budget(&self, profile: BriefingProfile) -> u32 {
        match profile {
            BriefingProfile::WeeklyNewsletter => self.generation.search_budget,
            BriefingProfile::DailyCoaching => 0,
        }
    }

    const fn uses_search(&self, profile: BriefingProfile) -> bool {
        self.search_budget(profile) > 0
    }
}

fn has_secret(secret: Option<&SecretString>) -> bool {
    secret.is_some_and(|s| !s.expose_secret().trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn complete() -> AppConfig {
        let mut config = AppConfig::default();
        config.apply_well_known_env(env(&[
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("BRAVE_API_KEY", "brave-test"),
            ("RECIPIENT_EMAIL", "reader@example.com"),
            ("GMAIL_TOKEN_JSON_B64", "e30="),
        ]));
        config
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.generation.search_budget, 15);
        assert_eq!(config.generation.max_turns, 20);
        assert_eq!(config.generation.turn_timeout_secs, 120);
        assert_eq!(config.generation.turn_attempts, 2);
        assert_eq!(config.generation.max_tokens, 4096);
        assert_eq!(config.mail.max_attempts, 3);
        assert_eq!(config.render.timezone, "UTC");
        assert_eq!(config.websearch.freshness.as_deref(), Some("pw"));
    }

    #[test]
    fn well_known_variables_fill_config() {
        let config = complete();
        assert!(config.validate(BriefingProfile::WeeklyNewsletter).is_ok());
        assert_eq!(
            config.mail.recipient().unwrap().as_str(),
            "reader@example.com"
        );
    }

    #[test]
    fn log_file_comes_from_environment() {
        assert!(AppConfig::default().logging.file.is_none());
        let mut config = complete();
        config.apply_well_known_env(env(&[("LOG_FILE", "/var/log/weekly-brief/newsletter.log")]));
        assert_eq!(
            config.logging.file.as_deref(),
            Some(Path::new("/var/log/weekly-brief/newsletter.log"))
        );
    }

    #[test]
    fn blank_variables_are_ignored() {
        let mut config = complete();
        config.apply_well_known_env(env(&[("RECIPIENT_EMAIL", "  ")]));
        assert_eq!(config.mail.recipient_email.as_deref(), Some("reader@example.com"));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let mut config = complete();
        config.generation.api_key = None;
        let err = config.validate(BriefingProfile::WeeklyNewsletter).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn search_key_only_needed_when_searching() {
        let mut config = complete();
        config.websearch.brave_api_key = None;
        assert!(config.validate(BriefingProfile::WeeklyNewsletter).is_err());
        assert!(config.validate(BriefingProfile::DailyCoaching).is_ok());

        config.generation.search_budget = 0;
        assert!(config.validate(BriefingProfile::WeeklyNewsletter).is_ok());
    }

    #[test]
    fn search_budget_above_fifteen_is_rejected() {
        let mut config = complete();
        config.generation.search_budget = 15;
        assert!(config.validate(BriefingProfile::WeeklyNewsletter).is_ok());

        config.generation.search_budget = 40;
        let err = config.validate(BriefingProfile::WeeklyNewsletter).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("at most 15")));
    }

    #[test]
    fn mail_token_source_is_required() {
        let mut config = complete();
        config.mail.token_json_b64 = None;
        assert!(config.validate(BriefingProfile::DailyCoaching).is_err());

        config.mail.token_path = Some(PathBuf::from("token.json"));
        assert!(config.validate(BriefingProfile::DailyCoaching).is_ok());
    }

    #[test]
    fn invalid_recipient_and_timezone_are_rejected() {
        let mut config = complete();
        config.mail.recipient_email = Some("not-an-address".into());
        assert!(config.validate(BriefingProfile::DailyCoaching).is_err());

        let mut config = complete();
        config.render.timezone = "Mars/Olympus".into();
        assert!(config.validate(BriefingProfile::DailyCoaching).is_err());

        config.render.timezone = "America/New_York".into();
        assert!(config.validate(BriefingProfile::DailyCoaching).is_ok());
    }

    #[test]
    fn coaching_runs_without_search_budget() {
        let config = complete();
        assert_eq!(config.search_budget(BriefingProfile::DailyCoaching), 0);
        assert_eq!(config.search_budget(BriefingProfile::WeeklyNewsletter), 15);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let debug = format!("{:?}", complete());
        assert!(!debug.contains("sk-ant-test"));
        assert!(!debug.contains("brave-test"));
        assert!(!debug.contains("e30="));
    }

    #[test]
    fn file_layer_is_read() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[generation]\nmodel = \"claude-opus-4-1\"\nsearch_budget = 8\n\n[render]\ntimezone = \"Europe/Berlin\"\n\n[mail]\nrecipient_email = \"file@example.com\""
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.generation.model, "claude-opus-4-1");
        assert_eq!(config.generation.search_budget, 8);
        assert_eq!(config.render.timezone, "Europe/Berlin");
        assert_eq!(config.generation.max_turns, 20);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/weekly-brief.toml"))).is_err());
    }

    #[test]
    fn derived_client_settings() {
        let config = complete();
        let anthropic = config.generation.anthropic_config();
        assert_eq!(anthropic.timeout_secs, 120);
        assert_eq!(anthropic.anthropic_version, "2023-06-01");

        let settings = config.generation.generator_settings(5);
        assert_eq!(settings.turn_retry.max_attempts, 2);
        assert_eq!(config.mail.retry().max_attempts, 3);
    }
}
