//! Newsletter pipeline - one run from generation to delivery
//!
//! ```text
//! Start -> Generating -> Rendering -> Sending -> Succeeded
//!              |             |           |
//!              +-------------+-----------+----> Failed
//! ```
//!
//! A stage runs only after the previous stage succeeded. Every transition is
//! logged, and a failed run logs exactly one error line naming the stage and
//! error kind. The [`PipelineReport`] carries the process exit code.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use domain::{DeliveryReceipt, EmailAddress, GenerationRequest, GenerationResult};
use serde::Serialize;
use tracing::{error, info, instrument};

use super::{ContentGenerator, MailDispatcher};
use crate::error::FailureKind;
use crate::ports::{CredentialProvider, RendererPort};

/// Stage that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipelineStage {
    Generating,
    Rendering,
    Sending,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Generating => "GENERATING",
            Self::Rendering => "RENDERING",
            Self::Sending => "SENDING",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipelineState {
    Start,
    Generating,
    Rendering,
    Sending,
    Succeeded,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Start => "START",
            Self::Generating => "GENERATING",
            Self::Rendering => "RENDERING",
            Self::Sending => "SENDING",
            Self::Succeeded => "SUCCESS",
            Self::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

impl From<PipelineStage> for PipelineState {
    fn from(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::Generating => Self::Generating,
            PipelineStage::Rendering => Self::Rendering,
            PipelineStage::Sending => Self::Sending,
        }
    }
}

/// Where and why a run failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    #[serde(serialize_with = "serialize_kind")]
    pub kind: FailureKind,
    pub message: String,
}

fn serialize_kind<S: serde::Serializer>(kind: &FailureKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.as_str())
}

/// Outcome of a run
#[derive(Debug)]
pub struct PipelineReport {
    pub final_state: PipelineState,
    pub result: Option<GenerationResult>,
    pub receipt: Option<DeliveryReceipt>,
    pub failure: Option<PipelineFailure>,
}

impl PipelineReport {
    pub const fn succeeded(&self) -> bool {
        matches!(self.final_state, PipelineState::Succeeded)
    }

    /// 0 on success, otherwise the failure kind's code
    pub fn exit_code(&self) -> u8 {
        self.failure.as_ref().map_or(0, |failure| failure.kind.exit_code())
    }
}

/// Runs the three stages in order for one recipient
pub struct NewsletterPipeline {
    generator: ContentGenerator,
    renderer: Arc<dyn RendererPort>,
    dispatcher: MailDispatcher,
    credentials: Arc<dyn CredentialProvider>,
    recipient: EmailAddress,
}

impl fmt::Debug for NewsletterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsletterPipeline")
            .field("generator", &self.generator)
            .field("dispatcher", &self.dispatcher)
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

impl NewsletterPipeline {
    pub fn new(
        generator: ContentGenerator,
        renderer: Arc<dyn RendererPort>,
        dispatcher: MailDispatcher,
        credentials: Arc<dyn CredentialProvider>,
        recipient: EmailAddress,
    ) -> Self {
        Self {
            generator,
            renderer,
            dispatcher,
            credentials,
            recipient,
        }
    }

    /// Execute one run
    #[instrument(skip(self, request), fields(profile = %request.profile(), recipient = %self.recipient))]
    pub async fn run(&self, request: &GenerationRequest) -> PipelineReport {
        let started = Instant::now();
        let mut run = RunTracker::new();

        run.enter(PipelineStage::Generating);
        let result = match self.generator.generate(request).await {
            Ok(result) => result,
            Err(err) => {
                return run.fail(
                    PipelineStage::Generating,
                    FailureKind::Generation,
                    err.to_string(),
                    None,
                    None,
                );
            },
        };
        info!(
            searches_used = result.searches_used(),
            turns = result.turns(),
            model = %result.model(),
            "Content generated"
        );

        run.enter(PipelineStage::Rendering);
        let email = match self.renderer.render(result.markdown()) {
            Ok(email) => email,
            Err(err) => {
                return run.fail(
                    PipelineStage::Rendering,
                    FailureKind::Render,
                    err.to_string(),
                    Some(result),
                    None,
                );
            },
        };
        info!(subject = %email.subject, html_bytes = email.html_body.len(), "Email rendered");

        run.enter(PipelineStage::Sending);
        let receipt = self
            .dispatcher
            .send(&email, &self.recipient, self.credentials.as_ref())
            .await;

        if let Some(kind) = receipt.failure_kind() {
            let message = receipt.failure_detail().unwrap_or_default().to_string();
            return run.fail(
                PipelineStage::Sending,
                FailureKind::from(kind),
                message,
                Some(result),
                Some(receipt),
            );
        }

        run.state = PipelineState::Succeeded;
        info!(
            state = %run.state,
            message_id = receipt.message_id().unwrap_or_default(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Pipeline finished"
        );

        PipelineReport {
            final_state: PipelineState::Succeeded,
            result: Some(result),
            receipt: Some(receipt),
            failure: None,
        }
    }
}

/// Tracks the current state and logs transitions
struct RunTracker {
    state: PipelineState,
}

impl RunTracker {
    fn new() -> Self {
        info!(state = %PipelineState::Start, "Pipeline started");
        Self {
            state: PipelineState::Start,
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        let next = PipelineState::from(stage);
        info!(from = %self.state, to = %next, "Pipeline transition");
        self.state = next;
    }

    fn fail(
        &mut self,
        stage: PipelineStage,
        kind: FailureKind,
        message: String,
        result: Option<GenerationResult>,
        receipt: Option<DeliveryReceipt>,
    ) -> PipelineReport {
        self.state = PipelineState::Failed;
        error!(
            state = %PipelineState::Failed,
            %stage,
            %kind,
            exit_code = kind.exit_code(),
            error = %message,
            "Pipeline failed"
        );
        PipelineReport {
            final_state: PipelineState::Failed,
            result,
            receipt,
            failure: Some(PipelineFailure {
                stage,
                kind,
                message,
            }),
        }
    }
}
