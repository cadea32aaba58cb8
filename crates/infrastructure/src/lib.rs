//! Infrastructure layer - Adapters, rendering and process setup
//!
//! Implements the application ports against the Anthropic, Brave and Gmail
//! clients, renders briefings to HTML email, loads layered configuration
//! and mail credentials, and assembles the pipeline.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod rendering;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::{RunOptions, build_pipeline, build_renderer, build_request, run_date};
pub use config::{AppConfig, ConfigError, GenerationConfig, LoggingConfig, MailConfig, RenderConfig};
pub use credentials::load_mail_credential;
pub use rendering::{EmailTheme, MarkdownEmailRenderer, markdown_to_html};
pub use telemetry::{LogGuard, TelemetryError, init_logging};
