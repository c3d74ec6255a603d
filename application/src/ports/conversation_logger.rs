//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording turn events
//! (model plans, tool calls and results, completed turns) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! conversation transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// Event type identifiers written by the orchestrator.
pub mod event_types {
    pub const TURN_STARTED: &str = "turn_started";
    pub const MODEL_PLAN: &str = "model_plan";
    pub const TOOL_CALL: &str = "tool_call";
    pub const TOOL_RESULT: &str = "tool_result";
    pub const TURN_COMPLETED: &str = "turn_completed";
}

/// A structured conversation event for logging.
///
/// The logger adds the timestamp when the event is written.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier, one of [`event_types`].
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// `log` is synchronous and infallible: a logging failure must never
/// disturb the turn being logged.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
