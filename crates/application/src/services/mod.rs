//! Application services - the pipeline stages and their orchestration

mod content_generator;
mod credential_manager;
mod mail_dispatcher;
mod pipeline;
pub mod prompts;

pub use content_generator::{ContentGenerator, FORCED_CONCLUSION_PROMPT, GeneratorSettings};
pub use credential_manager::CredentialManager;
pub use mail_dispatcher::MailDispatcher;
pub use pipeline::{
    NewsletterPipeline, PipelineFailure, PipelineReport, PipelineStage, PipelineState,
};
pub use prompts::{daily_coaching_request, weekly_newsletter_request};
