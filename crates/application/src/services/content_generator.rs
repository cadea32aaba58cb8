//! Content generator - the tool-use loop
//!
//! Drives a conversation with the text service until it produces a markdown
//! document. The loop is an explicit state machine:
//!
//! ```text
//! AwaitingModel -> ExecutingTools -> AwaitingModel -> ... -> Done
//! ```
//!
//! Every search consumes one unit of the request's [`SearchBudget`]. When the
//! budget runs out (or only one turn is left) the generator appends a
//! conclusion instruction and switches the tool choice to `none`, so the next
//! turn must be the final document. Each model turn runs under a timeout and
//! is retried according to [`GeneratorSettings::turn_retry`].
//!
//! [`SearchBudget`]: domain::SearchBudget

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domain::{
    ContentBlock, GenerationRequest, GenerationResult, Message, SearchBudget, ToolCall,
    ToolInvocation, Transcript, format_hits_for_model,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{ApplicationError, GenerationError};
use crate::ports::{
    ConversationPort, ConversationRequest, ModelTurn, StopReason, ToolChoice, ToolSpec,
    WEB_SEARCH_TOOL, WebSearchPort,
};
use crate::retry::{RetryConfig, with_retry};

/// Appended to the last tool-result message once searching must stop
pub const FORCED_CONCLUSION_PROMPT: &str = "The search budget for this run is used up. \
Do not request any more searches. Write the final document now using only the \
information gathered so far.";

/// Tuning knobs for the generation loop
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Hard cap on model turns, including the forced final one
    pub max_turns: u32,
    /// Timeout for a single model turn
    pub turn_timeout: Duration,
    /// Retry policy for a timed-out or transiently failing turn
    pub turn_retry: RetryConfig,
    /// Snippets requested per search
    pub results_per_search: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            max_turns: 20,
            turn_timeout: Duration::from_secs(120),
            turn_retry: RetryConfig::model_turns(),
            results_per_search: 5,
        }
    }
}

enum LoopState {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    Done(String),
}

/// Produces a [`GenerationResult`] from a [`GenerationRequest`]
pub struct ContentGenerator {
    conversation: Arc<dyn ConversationPort>,
    search: Arc<dyn WebSearchPort>,
    settings: GeneratorSettings,
}

impl fmt::Debug for ContentGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentGenerator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ContentGenerator {
    pub fn new(
        conversation: Arc<dyn ConversationPort>,
        search: Arc<dyn WebSearchPort>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            conversation,
            search,
            settings,
        }
    }

    /// Run the tool-use loop to completion
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the service is unreachable after
    /// retries, a turn is malformed, the final document is blank, or the
    /// turn cap is hit.
    #[instrument(skip(self, request), fields(profile = %request.profile()))]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let mut budget = request.search_budget();
        let tools = if budget.allows_searching() {
            vec![ToolSpec::web_search()]
        } else {
            Vec::new()
        };

        let mut transcript = Transcript::with_prompt(request.task_prompt());
        let mut tool_choice = ToolChoice::Auto;
        let mut turns = 0u32;
        let mut model = self.conversation.model_name();
        let mut state = LoopState::AwaitingModel;

        info!(
            search_budget = budget.limit(),
            window = %request.window(),
            "Starting content generation"
        );

        let markdown = loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if turns >= self.settings.max_turns {
                        return Err(GenerationError::TurnLimitExceeded { turns });
                    }
                    turns += 1;

                    let conversation_request = ConversationRequest {
                        system: request.system_prompt().to_string(),
                        messages: transcript.messages().to_vec(),
                        tools: tools.clone(),
                        tool_choice,
                    };
                    let turn = self.request_turn(&conversation_request, turns).await?;
                    if !turn.model.is_empty() {
                        model.clone_from(&turn.model);
                    }

                    let next = interpret_turn(&turn, tool_choice, budget.used())?;
                    transcript.push(Message::assistant(turn.content));
                    next
                },
                LoopState::ExecutingTools(calls) => {
                    let mut results = self.execute_tools(&calls, &mut budget).await;

                    let last_turn_next = turns + 1 >= self.settings.max_turns;
                    if budget.is_exhausted() || last_turn_next {
                        info!(
                            searches_used = budget.used(),
                            turns, "Forcing the model to conclude"
                        );
                        results.push(ContentBlock::text(FORCED_CONCLUSION_PROMPT));
                        tool_choice = ToolChoice::None;
                    }

                    transcript.push(Message::user(results));
                    LoopState::AwaitingModel
                },
                LoopState::Done(markdown) => break markdown,
            };
        };

        info!(
            searches_used = budget.used(),
            turns,
            chars = markdown.len(),
            "Content generation finished"
        );

        GenerationResult::new(markdown, budget.used(), model, turns)
            .map(|result| result.with_forced_conclusion(tool_choice == ToolChoice::None))
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))
    }

    /// One model turn with timeout and bounded retry
    async fn request_turn(
        &self,
        request: &ConversationRequest,
        turn_number: u32,
    ) -> Result<ModelTurn, GenerationError> {
        let conversation = self.conversation.as_ref();
        let timeout = self.settings.turn_timeout;

        debug!(
            turn = turn_number,
            messages = request.messages.len(),
            tool_choice = ?request.tool_choice,
            "Requesting model turn"
        );

        let outcome = with_retry(&self.settings.turn_retry, move || async move {
            match tokio::time::timeout(timeout, conversation.next_turn(request)).await {
                Ok(result) => result,
                Err(_) => Err(ApplicationError::Timeout(format!(
                    "model turn exceeded {}ms",
                    timeout.as_millis()
                ))),
            }
        })
        .await;

        let attempts = outcome.attempts;
        let turn = outcome.into_result().map_err(|err| match err {
            ApplicationError::Timeout(_) => GenerationError::TurnTimeout { attempts },
            ApplicationError::InvalidResponse(message) => {
                GenerationError::MalformedOutput(message)
            },
            ApplicationError::NotAuthorized(message)
            | ApplicationError::Rejected(message)
            | ApplicationError::Configuration(message) => GenerationError::Rejected(message),
            other => GenerationError::ServiceUnavailable(other.to_string()),
        })?;

        debug!(
            turn = turn_number,
            stop_reason = ?turn.stop_reason,
            blocks = turn.content.len(),
            "Model turn received"
        );
        Ok(turn)
    }

    /// Answer every tool call, in request order
    async fn execute_tools(
        &self,
        calls: &[ToolCall],
        budget: &mut SearchBudget,
    ) -> Vec<ContentBlock> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let block = if call.name != WEB_SEARCH_TOOL {
                warn!(tool = %call.name, "Model requested an unknown tool");
                ContentBlock::tool_error(&call.id, format!("Unknown tool '{}'", call.name))
            } else if let Some(query) = call.query() {
                match budget.try_consume() {
                    Some(sequence) => {
                        let invocation = ToolInvocation::new(query, sequence);
                        self.run_search(&call.id, &invocation).await
                    },
                    None => {
                        debug!(query, "Search refused, budget exhausted");
                        ContentBlock::tool_error(
                            &call.id,
                            "Search budget exhausted; no more searches are allowed.",
                        )
                    },
                }
            } else {
                ContentBlock::tool_error(&call.id, "Missing required string field 'query'")
            };
            results.push(block);
        }

        results
    }

    async fn run_search(&self, tool_use_id: &str, invocation: &ToolInvocation) -> ContentBlock {
        info!(
            sequence = invocation.sequence,
            query = %invocation.query,
            "Executing web search"
        );

        match self
            .search
            .search(&invocation.query, self.settings.results_per_search)
            .await
        {
            Ok(hits) => {
                debug!(sequence = invocation.sequence, hits = hits.len(), "Search completed");
                ContentBlock::tool_result(tool_use_id, format_hits_for_model(&invocation.query, &hits))
            },
            Err(err) => {
                warn!(
                    sequence = invocation.sequence,
                    error = %err,
                    "Search failed, reporting error to model"
                );
                ContentBlock::tool_error(tool_use_id, format!("Search failed: {err}"))
            },
        }
    }
}

/// Decide the next loop state from a model turn
fn interpret_turn(
    turn: &ModelTurn,
    tool_choice: ToolChoice,
    searches_used: u32,
) -> Result<LoopState, GenerationError> {
    let calls = turn.tool_calls();

    if tool_choice == ToolChoice::Auto && !calls.is_empty() {
        return Ok(LoopState::ExecutingTools(calls));
    }

    if turn.stop_reason == StopReason::MaxTokens {
        warn!("Model hit the token limit; the document may be truncated");
    }

    match turn.text() {
        Some(text) if !text.trim().is_empty() => Ok(LoopState::Done(text)),
        Some(_) => Err(GenerationError::EmptyOutput { searches_used }),
        None if calls.is_empty() => Err(GenerationError::ProtocolViolation(
            "turn contained neither text nor tool requests".to_string(),
        )),
        None => Err(GenerationError::ProtocolViolation(
            "model requested tools after being told to conclude".to_string(),
        )),
    }
}
