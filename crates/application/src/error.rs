//! Application-level errors
//!
//! [`ApplicationError`] is what adapters return through the ports. The stage
//! errors ([`GenerationError`], [`RenderError`], [`DeliveryError`]) are what
//! the pipeline reasons about when it decides how a run ended.

use std::fmt;

use domain::{DeliveryFailureKind, DomainError};
use thiserror::Error;

use crate::retry::Retryable;

/// Errors returned by port implementations
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// External service unreachable or answering with a server error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Call did not complete in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Credentials rejected by the external service
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Service answered with something we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request rejected as invalid by the external service
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ExternalService(_) | Self::Timeout(_)
        )
    }
}

impl Retryable for ApplicationError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// Content generation failed
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Text service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Model turn timed out on all {attempts} attempts")]
    TurnTimeout { attempts: u32 },

    #[error("Text service rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Model produced an empty document after {searches_used} searches")]
    EmptyOutput { searches_used: u32 },

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Conversation did not converge within {turns} model turns")]
    TurnLimitExceeded { turns: u32 },
}

/// Rendering failed
///
/// Markdown never causes this; only a broken email template does.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Email template error: {0}")]
    Template(String),
}

/// Mail delivery failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Credential missing or invalid, refresh rejected, or token refused
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network failure, 5xx or throttling
    #[error("Transient delivery failure: {0}")]
    Transient(String),

    /// Provider refused the message
    #[error("Message rejected: {0}")]
    Permanent(String),
}

impl DeliveryError {
    pub const fn kind(&self) -> DeliveryFailureKind {
        match self {
            Self::Auth(_) => DeliveryFailureKind::Auth,
            Self::Transient(_) => DeliveryFailureKind::Transient,
            Self::Permanent(_) => DeliveryFailureKind::Permanent,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Auth(detail) | Self::Transient(detail) | Self::Permanent(detail) => detail,
        }
    }
}

impl Retryable for DeliveryError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Error kind recorded when a run ends in FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Generation,
    Render,
    Auth,
    TransientDelivery,
    PermanentDelivery,
}

impl FailureKind {
    /// Process exit status reported to the scheduler
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Generation => 3,
            Self::Render => 4,
            Self::Auth => 5,
            Self::TransientDelivery => 6,
            Self::PermanentDelivery => 7,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generation => "GenerationError",
            Self::Render => "RenderError",
            Self::Auth => "AuthError",
            Self::TransientDelivery => "TransientDeliveryError",
            Self::PermanentDelivery => "PermanentDeliveryError",
        }
    }
}

impl From<DeliveryFailureKind> for FailureKind {
    fn from(kind: DeliveryFailureKind) -> Self {
        match kind {
            DeliveryFailureKind::Auth => Self::Auth,
            DeliveryFailureKind::Transient => Self::TransientDelivery,
            DeliveryFailureKind::Permanent => Self::PermanentDelivery,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
