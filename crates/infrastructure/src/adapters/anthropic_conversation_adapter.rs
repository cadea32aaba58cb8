//! Conversation adapter - Implements ConversationPort using ai_core

use ai_core::{
    AnthropicClient, AnthropicConfig, InferenceError, MessagesRequest, MessagesResponse,
    ToolDefinition,
};
use application::error::ApplicationError;
use application::ports::{
    ConversationPort, ConversationRequest, ModelTurn, StopReason, ToolChoice, ToolSpec,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Text service backed by the Anthropic Messages API
#[derive(Debug)]
pub struct AnthropicConversationAdapter {
    client: AnthropicClient,
}

impl AnthropicConversationAdapter {
    pub fn new(config: AnthropicConfig) -> Result<Self, ApplicationError> {
        let client = AnthropicClient::new(config).map_err(Self::map_error)?;
        Ok(Self { client })
    }

    fn build_request(&self, request: &ConversationRequest) -> MessagesRequest {
        let tools = request.tools.iter().map(Self::map_tool).collect();
        let choice = match request.tool_choice {
            ToolChoice::Auto => ai_core::ToolChoice::Auto,
            ToolChoice::None => ai_core::ToolChoice::None,
        };

        MessagesRequest::new(
            self.client.model(),
            self.client.config().max_tokens,
            request.messages.clone(),
        )
        .with_system(request.system.clone())
        .with_tools(tools, choice)
    }

    fn map_tool(spec: &ToolSpec) -> ToolDefinition {
        ToolDefinition {
            name: spec.name.clone(),
            description: spec.description.clone(),
            input_schema: spec.input_schema.clone(),
        }
    }

    fn map_response(response: &MessagesResponse) -> ModelTurn {
        let stop_reason = match response.stop_reason {
            Some(ai_core::StopReason::EndTurn) => StopReason::EndTurn,
            Some(ai_core::StopReason::ToolUse) => StopReason::ToolUse,
            Some(ai_core::StopReason::MaxTokens) => StopReason::MaxTokens,
            Some(ai_core::StopReason::StopSequence) => StopReason::Other("stop_sequence".into()),
            Some(ai_core::StopReason::PauseTurn) => StopReason::Other("pause_turn".into()),
            Some(ai_core::StopReason::Refusal) => StopReason::Other("refusal".into()),
            Some(ai_core::StopReason::Unknown) => StopReason::Other("unknown".into()),
            None => StopReason::Other("unspecified".into()),
        };

        ModelTurn {
            content: response.transcript_blocks(),
            stop_reason,
            model: response.model.clone(),
        }
    }

    /// Map inference errors to application errors
    fn map_error(err: InferenceError) -> ApplicationError {
        match err {
            InferenceError::Authentication(msg) => ApplicationError::NotAuthorized(msg),
            InferenceError::InvalidRequest(msg) => ApplicationError::Rejected(msg),
            InferenceError::InvalidResponse(msg) => ApplicationError::InvalidResponse(msg),
            InferenceError::Configuration(msg) => ApplicationError::Configuration(msg),
            InferenceError::Timeout(ms) => {
                ApplicationError::Timeout(format!("Messages API did not answer within {ms}ms"))
            },
            InferenceError::RateLimited => ApplicationError::RateLimited,
            InferenceError::ConnectionFailed(msg)
            | InferenceError::RequestFailed(msg)
            | InferenceError::ServerError(msg) => ApplicationError::ExternalService(msg),
        }
    }
}

#[async_trait]
impl ConversationPort for AnthropicConversationAdapter {
    #[instrument(skip(self, request), fields(messages = request.messages.len(), tools = request.tools.len()))]
    async fn next_turn(&self, request: &ConversationRequest) -> Result<ModelTurn, ApplicationError> {
        let body = self.build_request(request);
        let response = self
            .client
            .create_message(&body)
            .await
            .map_err(Self::map_error)?;

        debug!(
            id = %response.id,
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Model turn received"
        );
        Ok(Self::map_response(&response))
    }

    fn model_name(&self) -> String {
        self.client.model().to_string()
    }
}

#[cfg(test)]
mod tests {
    use domain::{ContentBlock, Message};
    use secrecy::SecretString;

    use super::*;

    fn adapter() -> AnthropicConversationAdapter {
        AnthropicConversationAdapter::new(AnthropicConfig {
            api_key: Some(SecretString::from("sk-ant-test")),
            max_tokens: 1024,
            ..AnthropicConfig::default()
        })
        .unwrap()
    }

    fn request(tool_choice: ToolChoice, tools: Vec<ToolSpec>) -> ConversationRequest {
        ConversationRequest {
            system: "You are an editor.".into(),
            messages: vec![Message::user(vec![ContentBlock::text("Write it")])],
            tools,
            tool_choice,
        }
    }

    #[test]
    fn missing_api_key_is_configuration_error() {
        let err = AnthropicConversationAdapter::new(AnthropicConfig::default()).unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
    }

    #[test]
    fn request_carries_tools_and_choice() {
        let body = adapter().build_request(&request(ToolChoice::None, vec![ToolSpec::web_search()]));
        assert_eq!(body.max_tokens, 1024);
        assert_eq!(body.system.as_deref(), Some("You are an editor."));
        assert_eq!(body.tools.len(), 1);
        assert_eq!(body.tools[0].name, "web_search");
        assert_eq!(body.tool_choice, Some(ai_core::ToolChoice::None));
    }

    #[test]
    fn request_without_tools_omits_choice() {
        let body = adapter().build_request(&request(ToolChoice::Auto, Vec::new()));
        assert!(body.tools.is_empty());
        assert!(body.tool_choice.is_none());
    }

    #[test]
    fn errors_map_to_port_errors() {
        assert!(matches!(
            AnthropicConversationAdapter::map_error(InferenceError::Authentication("bad key".into())),
            ApplicationError::NotAuthorized(_)
        ));
        assert!(matches!(
            AnthropicConversationAdapter::map_error(InferenceError::Timeout(120_000)),
            ApplicationError::Timeout(_)
        ));
        let mapped =
            AnthropicConversationAdapter::map_error(InferenceError::ServerError("overloaded".into()));
        let ApplicationError::ExternalService(msg) = mapped else {
            unreachable!("Expected ExternalService error");
        };
        assert_eq!(msg, "overloaded");
        assert!(AnthropicConversationAdapter::map_error(InferenceError::RateLimited).is_retryable());
        assert!(
            !AnthropicConversationAdapter::map_error(InferenceError::InvalidRequest("x".into()))
                .is_retryable()
        );
    }
}
