//! Turn entities

use crate::tool::entities::ToolCall;
use crate::tool::value_objects::{ToolFailure, ToolStatus};
use serde::{Deserialize, Serialize};

/// States of the per-turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    AwaitingModelPlan,
    NoToolDetected,
    AwaitingFinalText,
    ToolDetected,
    Normalizing,
    Dispatching,
    Unwrapping,
    AwaitingModelSummary,
    Done,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::AwaitingModelPlan => "awaiting_model_plan",
            TurnPhase::NoToolDetected => "no_tool_detected",
            TurnPhase::AwaitingFinalText => "awaiting_final_text",
            TurnPhase::ToolDetected => "tool_detected",
            TurnPhase::Normalizing => "normalizing",
            TurnPhase::Dispatching => "dispatching",
            TurnPhase::Unwrapping => "unwrapping",
            TurnPhase::AwaitingModelSummary => "awaiting_model_summary",
            TurnPhase::Done => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Done)
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The model answered without calling a tool.
    Answered,
    /// The model's call could not be normalized; its text was used as the answer.
    MalformedCall { reason: String },
    /// A tool ran (or reported an error) and the model summarized the result.
    Summarized,
    /// The tool could not be run or its response could not be decoded.
    ToolFailed(ToolFailure),
    /// The model could not be reached.
    ModelUnavailable { message: String },
}

impl TurnOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TurnOutcome::ToolFailed(_) | TurnOutcome::ModelUnavailable { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::Answered => "answered",
            TurnOutcome::MalformedCall { .. } => "malformed_call",
            TurnOutcome::Summarized => "summarized",
            TurnOutcome::ToolFailed(_) => "tool_failed",
            TurnOutcome::ModelUnavailable { .. } => "model_unavailable",
        }
    }
}

/// One user turn (Entity)
///
/// Built up in place by the orchestrator while the turn runs, then handed
/// to [`History::record`](crate::session::entities::History::record) by
/// [`Turn::finish`]. Nothing mutates a turn once it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub utterance: String,
    pub alert_intent: bool,
    /// Raw text of the first model response
    pub plan: Option<String>,
    pub invocation: Option<ToolCall>,
    pub tool_status: Option<ToolStatus>,
    pub answer: String,
    pub outcome: TurnOutcome,
    /// Phases visited, in order
    pub phases: Vec<TurnPhase>,
}

impl Turn {
    pub fn begin(utterance: impl Into<String>, alert_intent: bool) -> Self {
        Self {
            utterance: utterance.into(),
            alert_intent,
            plan: None,
            invocation: None,
            tool_status: None,
            answer: String::new(),
            outcome: TurnOutcome::Answered,
            phases: vec![TurnPhase::Idle],
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phases.last().copied().unwrap_or(TurnPhase::Idle)
    }

    pub fn advance(&mut self, phase: TurnPhase) {
        if self.phase() != phase {
            self.phases.push(phase);
        }
    }

    pub fn visited(&self, phase: TurnPhase) -> bool {
        self.phases.contains(&phase)
    }

    /// Close the turn with its final answer.
    pub fn finish(mut self, answer: impl Into<String>, outcome: TurnOutcome) -> Self {
        self.answer = answer.into();
        self.outcome = outcome;
        self.advance(TurnPhase::Done);
        self
    }

    /// Compact JSON note kept in history in place of the tool payload.
    pub fn tool_note(&self) -> Option<String> {
        let call = self.invocation.as_ref()?;
        let status = self.tool_status?;
        Some(
            serde_json::json!({
                "tool": call.tool_name,
                "arguments": call.arguments_json(),
                "status": status.to_string(),
            })
            .to_string(),
        )
    }
}
