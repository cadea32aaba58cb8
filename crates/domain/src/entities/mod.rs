//! Domain entities - the artifacts passed between pipeline stages

mod delivery;
mod generation;
mod mail_credential;
mod rendered_email;
pub mod transcript;
mod web_search;

pub use delivery::{DeliveryFailureKind, DeliveryOutcome, DeliveryReceipt};
pub use generation::{BriefingProfile, GenerationRequest, GenerationResult, Topic, placeholders};
pub use mail_credential::{DEFAULT_TOKEN_URI, EXPIRY_SKEW_SECS, MailCredential};
pub use rendered_email::RenderedEmail;
pub use transcript::{ContentBlock, Message, Role, ToolCall, ToolInvocation, Transcript};
pub use web_search::{SearchHit, format_hits_for_model};
