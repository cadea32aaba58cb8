//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod conversation_port;
mod credential_provider;
mod credential_store_port;
mod mail_transport_port;
mod renderer_port;
mod token_refresh_port;
mod websearch_port;

#[cfg(test)]
pub use conversation_port::MockConversationPort;
pub use conversation_port::{
    ConversationPort, ConversationRequest, ModelTurn, StopReason, ToolChoice, ToolSpec,
    WEB_SEARCH_TOOL,
};
#[cfg(test)]
pub use credential_provider::MockCredentialProvider;
pub use credential_provider::CredentialProvider;
#[cfg(test)]
pub use credential_store_port::MockCredentialStorePort;
pub use credential_store_port::CredentialStorePort;
#[cfg(test)]
pub use mail_transport_port::MockMailTransportPort;
pub use mail_transport_port::{MailTransportPort, OutgoingMail};
#[cfg(test)]
pub use renderer_port::MockRendererPort;
pub use renderer_port::RendererPort;
#[cfg(test)]
pub use token_refresh_port::MockTokenRefreshPort;
pub use token_refresh_port::{AccessGrant, TokenRefreshPort};
#[cfg(test)]
pub use websearch_port::MockWebSearchPort;
pub use websearch_port::WebSearchPort;
