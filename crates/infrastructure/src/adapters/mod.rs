//! Infrastructure adapters
//!
//! Adapters connect application ports to the integration crates.

mod anthropic_conversation_adapter;
mod file_credential_store;
mod gmail_adapter;
mod websearch_adapter;

pub use anthropic_conversation_adapter::AnthropicConversationAdapter;
pub use file_credential_store::FileCredentialStore;
pub use gmail_adapter::{GmailTokenRefresher, GmailTransportAdapter};
pub use websearch_adapter::{BraveSearchAdapter, DisabledSearchAdapter};
