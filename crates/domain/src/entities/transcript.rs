//! Conversation transcript for the tool-use loop
//!
//! Mirrors the block structure of tool-calling chat APIs: assistant turns
//! carry text and tool requests, user turns carry prompts and tool results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speaker of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text { text: String },

    /// Model asks for a tool to be executed
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },

    /// Output of a tool, answering a `ToolUse` with the same id
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn tool_error(tool_use_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: message.into(),
            is_error: true,
        }
    }

    /// View a `ToolUse` block as a [`ToolCall`]
    pub fn as_tool_call(&self) -> Option<ToolCall> {
        match self {
            Self::ToolUse { id, name, input } => Some(ToolCall {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            _ => None,
        }
    }
}

/// A tool request pulled out of an assistant turn
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolCall {
    /// The `query` string argument, if present and non-blank
    pub fn query(&self) -> Option<&str> {
        self.input
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// A search actually issued on behalf of the model
///
/// Exists only for the duration of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub query: String,
    /// 1-based position among all searches in the run
    pub sequence: u32,
}

impl ToolInvocation {
    pub fn new(query: impl Into<String>, sequence: u32) -> Self {
        Self {
            query: query.into(),
            sequence,
        }
    }
}

/// A single transcript message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    pub fn tool_calls(&self) -> Vec<ToolCall> {
        tool_calls(&self.content)
    }
}

/// Tool requests in the order the model issued them
pub fn tool_calls(blocks: &[ContentBlock]) -> Vec<ToolCall> {
    blocks.iter().filter_map(ContentBlock::as_tool_call).collect()
}

/// Non-empty text blocks joined by a blank line
///
/// Returns `None` when there is no text block at all and an empty string
/// when every text block is blank.
pub fn joined_text(blocks: &[ContentBlock]) -> Option<String> {
    let texts: Vec<&str> = blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();

    if texts.is_empty() {
        return None;
    }

    Some(
        texts
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
    )
}

/// Ordered message history of one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transcript with the task prompt as the first user message
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.push(Message::user(vec![ContentBlock::text(prompt)]));
        transcript
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
