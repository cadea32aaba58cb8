//! Conversation port - one turn of a tool-augmented chat with the text service

use async_trait::async_trait;
use domain::{ContentBlock, Message, ToolCall, transcript};
#[cfg(test)]
use mockall::automock;
use serde_json::{Value, json};

use crate::error::ApplicationError;

/// Name of the only tool offered to the model
pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Declaration of a tool the model may call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool input
    pub input_schema: Value,
}

impl ToolSpec {
    /// The `web_search` tool: `{ "query": string }`
    pub fn web_search() -> Self {
        Self {
            name: WEB_SEARCH_TOOL.to_string(),
            description: "Search the web for recent news and announcements. \
                          Returns titles, URLs and short excerpts."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }
}

/// Whether the model may call tools on this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoice {
    /// Model decides
    #[default]
    Auto,
    /// Tools stay declared but must not be called
    None,
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Other(String),
}

/// Everything sent to the text service for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    pub tool_choice: ToolChoice,
}

/// One assistant reply
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTurn {
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
    /// Model identifier reported by the service
    pub model: String,
}

impl ModelTurn {
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        transcript::tool_calls(&self.content)
    }

    /// See [`transcript::joined_text`]
    pub fn text(&self) -> Option<String> {
        transcript::joined_text(&self.content)
    }
}

/// Port for the generative-text service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConversationPort: Send + Sync {
    /// Send the conversation so far and return the model's next turn
    async fn next_turn(&self, request: &ConversationRequest) -> Result<ModelTurn, ApplicationError>;

    /// Configured model identifier
    fn model_name(&self) -> String;
}
