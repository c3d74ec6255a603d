//! Run Turn use case.
//!
//! Drives one user turn through the per-turn state machine:
//!
//! ```text
//! Idle → AwaitingModelPlan ─┬─ NoToolDetected → AwaitingFinalText ──────────────┐
//!                           └─ ToolDetected → Normalizing → Dispatching          │
//!                                → Unwrapping → AwaitingModelSummary ────────────┴→ Done
//! ```
//!
//! [`ConversationSession`] owns the [`History`]; every terminal turn,
//! successful or not, is recorded before the next one starts.

use crate::config::TurnParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::TurnProgressNotifier;
use crate::ports::tool_executor::ToolExecutorPort;
use sre_domain::util::preview;
use sre_domain::{
    CallNormalizer, FailureStage, History, Message, PromptTemplate, ToolCall, ToolFailure,
    ToolResult, Turn, TurnOutcome, TurnPhase, Utterance, scan,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failures that end a turn without a tool-derived answer.
///
/// The turn is still recorded with an explanatory answer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TurnError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] GatewayError),

    #[error("Tool dispatch failed: {0}")]
    DispatchExhausted(ToolFailure),
}

/// Result of [`ConversationSession::run_turn`].
#[derive(Debug, Clone)]
pub struct TurnOutput {
    /// The turn as recorded in history
    pub turn: Turn,
    pub error: Option<TurnError>,
}

impl TurnOutput {
    pub fn answer(&self) -> &str {
        &self.turn.answer
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// One conversation with the model and the tool process.
///
/// Turns are serialized: `run_turn` takes `&mut self`, so the next turn
/// cannot start before the previous one has been recorded.
pub struct ConversationSession {
    gateway: Arc<dyn LlmGateway>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    params: TurnParams,
    system_prompt: String,
    history: History,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ConversationSession {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        params: TurnParams,
    ) -> Self {
        let system_prompt = PromptTemplate::system(tool_executor.tool_spec());
        Self {
            gateway,
            tool_executor,
            params,
            system_prompt,
            history: History::new(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tool_executor(&self) -> &dyn ToolExecutorPort {
        self.tool_executor.as_ref()
    }

    /// Run one turn to completion and record it.
    pub async fn run_turn(
        &mut self,
        utterance: Utterance,
        progress: &dyn TurnProgressNotifier,
    ) -> TurnOutput {
        let text = utterance.into_content();
        let alert_intent = self.params.intent.detect(&text);
        info!("Starting turn {}: {}", self.history.turn_count() + 1, preview(&text, 100));
        if alert_intent {
            info!("Detected request for alert monitors");
        }

        self.conversation_logger.log(ConversationEvent::new(
            event_types::TURN_STARTED,
            serde_json::json!({
                "turn": self.history.turn_count() + 1,
                "text": text,
                "alert_intent": alert_intent,
            }),
        ));

        let turn = Turn::begin(text, alert_intent);
        let (turn, error) = self.drive(turn, progress).await;
        progress.on_phase(TurnPhase::Done);

        self.conversation_logger.log(ConversationEvent::new(
            event_types::TURN_COMPLETED,
            serde_json::json!({
                "outcome": turn.outcome.as_str(),
                "phases": turn.phases.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                "tool": turn.invocation.as_ref().map(|c| c.tool_name.clone()),
                "answer": turn.answer,
            }),
        ));
        info!(
            "Turn completed: {} ({} phases)",
            turn.outcome.as_str(),
            turn.phases.len()
        );

        self.history.record(turn.clone());
        progress.on_turn_complete(&turn);

        TurnOutput { turn, error }
    }

    async fn drive(
        &self,
        mut turn: Turn,
        progress: &dyn TurnProgressNotifier,
    ) -> (Turn, Option<TurnError>) {
        enter(&mut turn, TurnPhase::AwaitingModelPlan, progress);

        let mut messages = self.history.messages().to_vec();
        messages.push(Message::user(turn.utterance.clone()));

        let plan = match self.gateway.chat(&self.system_prompt, &messages).await {
            Ok(plan) => plan,
            Err(e) => return model_unavailable(turn, e),
        };
        debug!("Model plan: {}", preview(&plan, 200));
        self.conversation_logger.log(ConversationEvent::new(
            event_types::MODEL_PLAN,
            serde_json::json!({
                "model": self.gateway.model_name(),
                "bytes": plan.len(),
                "text": plan,
            }),
        ));
        turn.plan = Some(plan.clone());

        let Some(candidate) = scan(&plan) else {
            enter(&mut turn, TurnPhase::NoToolDetected, progress);
            enter(&mut turn, TurnPhase::AwaitingFinalText, progress);
            return (turn.finish(plan, TurnOutcome::Answered), None);
        };

        enter(&mut turn, TurnPhase::ToolDetected, progress);
        enter(&mut turn, TurnPhase::Normalizing, progress);
        let normalizer = CallNormalizer::new(self.tool_executor.tool_spec(), &self.params.filter);
        let call = match normalizer.normalize(candidate, turn.alert_intent) {
            Ok(call) => call,
            Err(e) => {
                warn!("Malformed tool call, answering with model text: {}", e);
                let outcome = TurnOutcome::MalformedCall {
                    reason: e.to_string(),
                };
                return (turn.finish(plan, outcome), None);
            }
        };
        turn.invocation = Some(call.clone());

        enter(&mut turn, TurnPhase::Dispatching, progress);
        let result = self.dispatch(&call, progress).await;
        turn.tool_status = Some(result.status());
        progress.on_tool_complete(&result);

        match result.failure_ref() {
            Some(failure) if failure.is_dispatch() => {
                warn!(
                    "Dispatch of '{}' failed after {} attempt(s): {}",
                    call.tool_name, result.metadata.attempts, failure
                );
                let answer = PromptTemplate::tool_failure_answer(&call, failure);
                let outcome = TurnOutcome::ToolFailed(failure.clone());
                return (
                    turn.finish(answer, outcome),
                    Some(TurnError::DispatchExhausted(failure.clone())),
                );
            }
            Some(failure) if failure.stage() == FailureStage::Unwrap => {
                enter(&mut turn, TurnPhase::Unwrapping, progress);
                warn!("Could not decode '{}' response: {}", call.tool_name, failure);
                let answer = PromptTemplate::tool_failure_answer(&call, failure);
                let outcome = TurnOutcome::ToolFailed(failure.clone());
                return (turn.finish(answer, outcome), None);
            }
            _ => enter(&mut turn, TurnPhase::Unwrapping, progress),
        }

        enter(&mut turn, TurnPhase::AwaitingModelSummary, progress);
        messages.push(Message::assistant(plan));
        messages.push(Message::tool(PromptTemplate::tool_result(&call, &result)));

        match self.gateway.chat(&self.system_prompt, &messages).await {
            Ok(summary) => (turn.finish(summary, TurnOutcome::Summarized), None),
            Err(e) => model_unavailable(turn, e),
        }
    }

    /// Dispatch with retries on dispatch-stage failures only.
    async fn dispatch(&self, call: &ToolCall, progress: &dyn TurnProgressNotifier) -> ToolResult {
        let max_attempts = self.params.max_dispatch_attempts.max(1);
        let mut attempt = 1;

        loop {
            info!(
                "Calling tool '{}' (attempt {}/{}) with {}",
                call.tool_name,
                attempt,
                max_attempts,
                call.arguments_json()
            );
            progress.on_tool_dispatch(call, attempt);
            self.conversation_logger.log(ConversationEvent::new(
                event_types::TOOL_CALL,
                serde_json::json!({
                    "tool": call.tool_name,
                    "arguments": call.arguments_json(),
                    "attempt": attempt,
                }),
            ));

            let mut result = self.tool_executor.execute(call).await;
            result.metadata.attempts = attempt;
            self.log_tool_result(&result);

            match result.failure_ref() {
                Some(failure) if failure.is_dispatch() && attempt < max_attempts => {
                    warn!("Tool dispatch attempt {} failed: {}", attempt, failure);
                    if !self.params.retry_delay.is_zero() {
                        tokio::time::sleep(self.params.retry_delay).await;
                    }
                    attempt += 1;
                }
                _ => return result,
            }
        }
    }

    fn log_tool_result(&self, result: &ToolResult) {
        let mut payload = serde_json::json!({
            "tool": result.tool_name,
            "status": result.status().to_string(),
            "attempt": result.metadata.attempts,
            "duration_ms": result.metadata.duration_ms,
            "request_id": result.metadata.request_id,
        });
        match &result.outcome {
            Ok(p) => payload["bytes"] = serde_json::json!(p.rendered_len()),
            Err(f) => payload["error"] = serde_json::json!(f.to_string()),
        }
        self.conversation_logger
            .log(ConversationEvent::new(event_types::TOOL_RESULT, payload));
    }
}

fn enter(turn: &mut Turn, phase: TurnPhase, progress: &dyn TurnProgressNotifier) {
    debug!("Turn phase: {} -> {}", turn.phase(), phase);
    turn.advance(phase);
    progress.on_phase(phase);
}

fn model_unavailable(turn: Turn, error: GatewayError) -> (Turn, Option<TurnError>) {
    warn!("Model call failed: {}", error);
    let answer = PromptTemplate::model_unavailable_answer(&error.to_string());
    let outcome = TurnOutcome::ModelUnavailable {
        message: error.to_string(),
    };
    (
        turn.finish(answer, outcome),
        Some(TurnError::ModelUnavailable(error)),
    )
}
