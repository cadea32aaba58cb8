//! Application layer - Use cases and orchestration
//!
//! Holds the port definitions and the services that drive one newsletter
//! run: content generation, delivery and the pipeline tying them together.

pub mod error;
pub mod ports;
pub mod retry;
pub mod services;

pub use error::{ApplicationError, DeliveryError, FailureKind, GenerationError, RenderError};
pub use ports::*;
pub use retry::{RetryConfig, Retryable, with_retry};
pub use services::*;
