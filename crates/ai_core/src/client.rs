//! Anthropic Messages API client

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use crate::config::AnthropicConfig;
use crate::error::InferenceError;
use crate::messages::{MessagesRequest, MessagesResponse};

/// Thin client over `POST /v1/messages`
///
/// Performs exactly one HTTP call per [`create_message`](Self::create_message);
/// retry policy belongs to the caller.
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
    api_key: SecretString,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Fails when the API key is missing or the HTTP client cannot be built.
    pub fn new(config: AnthropicConfig) -> Result<Self, InferenceError> {
        let api_key = config
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .map(|key| SecretString::from(key.expose_secret().to_owned()))
            .ok_or_else(|| InferenceError::Configuration("Anthropic API key is not set".into()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| InferenceError::Configuration(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "Initialized Anthropic client"
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub const fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Send one Messages API request
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses and undecodable bodies are
    /// returned as classified [`InferenceError`]s.
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    pub async fn create_message(
        &self,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, InferenceError> {
        debug!(tools = request.tools.len(), "Sending Messages API request");

        let response = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", &self.config.anthropic_version)
            .json(request)
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = InferenceError::from_status(status, &body);
            warn!(status = %status, error = %err, "Messages API request failed");
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout()))?;
        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        debug!(
            id = %parsed.id,
            stop_reason = ?parsed.stop_reason,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Messages API response received"
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_configuration_error() {
        let err = AnthropicClient::new(AnthropicConfig::default()).unwrap_err();
        assert!(matches!(err, InferenceError::Configuration(_)));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let err = AnthropicClient::new(AnthropicConfig::with_api_key("  ")).unwrap_err();
        assert!(matches!(err, InferenceError::Configuration(_)));
    }

    #[test]
    fn client_reports_configured_model() {
        let client = AnthropicClient::new(AnthropicConfig::with_api_key("sk-ant-test")).unwrap();
        assert_eq!(client.model(), "claude-sonnet-4-5-20250929");
        assert!(!format!("{client:?}").contains("sk-ant-test"));
    }
}
