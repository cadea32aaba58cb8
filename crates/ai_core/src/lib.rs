//! AI Core - Client for the Anthropic Messages API
//!
//! Speaks the tool-use dialect of the Messages API: requests carry the
//! conversation, declared tools and a tool choice; responses carry text
//! and `tool_use` blocks plus a stop reason.

pub mod client;
pub mod config;
pub mod error;
pub mod messages;

pub use client::AnthropicClient;
pub use config::AnthropicConfig;
pub use error::InferenceError;
pub use messages::{
    MessagesRequest, MessagesResponse, ResponseBlock, StopReason, ToolChoice, ToolDefinition,
    Usage,
};
