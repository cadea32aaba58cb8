//! Delivery receipt - terminal result of a send attempt

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::EmailAddress;

/// Why a delivery failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryFailureKind {
    /// Credential missing, refresh rejected, or provider refused the token
    Auth,
    /// Network error or provider 5xx/429, still failing after retries
    Transient,
    /// Provider rejected the message (bad recipient, quota)
    Permanent,
}

impl fmt::Display for DeliveryFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Auth => "auth",
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered { message_id: String },
    Failed { kind: DeliveryFailureKind, detail: String },
}

/// Result of one `send` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub outcome: DeliveryOutcome,
    pub recipient: EmailAddress,
    /// Send attempts made, 0 when delivery was abandoned before sending
    pub attempts: u32,
    pub completed_at: DateTime<Utc>,
}

impl DeliveryReceipt {
    pub fn delivered(recipient: EmailAddress, message_id: impl Into<String>, attempts: u32) -> Self {
        Self {
            outcome: DeliveryOutcome::Delivered {
                message_id: message_id.into(),
            },
            recipient,
            attempts,
            completed_at: Utc::now(),
        }
    }

    pub fn failed(
        recipient: EmailAddress,
        kind: DeliveryFailureKind,
        detail: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            outcome: DeliveryOutcome::Failed {
                kind,
                detail: detail.into(),
            },
            recipient,
            attempts,
            completed_at: Utc::now(),
        }
    }

    pub const fn is_delivered(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Delivered { .. })
    }

    pub fn message_id(&self) -> Option<&str> {
        match &self.outcome {
            DeliveryOutcome::Delivered { message_id } => Some(message_id),
            DeliveryOutcome::Failed { .. } => None,
        }
    }

    pub const fn failure_kind(&self) -> Option<DeliveryFailureKind> {
        match &self.outcome {
            DeliveryOutcome::Delivered { .. } => None,
            DeliveryOutcome::Failed { kind, .. } => Some(*kind),
        }
    }

    pub fn failure_detail(&self) -> Option<&str> {
        match &self.outcome {
            DeliveryOutcome::Delivered { .. } => None,
            DeliveryOutcome::Failed { detail, .. } => Some(detail),
        }
    }
}
