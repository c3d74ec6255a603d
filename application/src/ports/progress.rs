//! Progress notification port
//!
//! Defines the interface for reporting progress while a turn runs.

use sre_domain::{ToolCall, ToolResult, Turn, TurnPhase};

/// Callback for progress updates during a turn
///
/// Implementations live in the presentation layer (spinner, plain log).
/// All methods default to no-ops.
pub trait TurnProgressNotifier: Send + Sync {
    /// Called whenever the turn enters a new phase
    fn on_phase(&self, _phase: TurnPhase) {}

    /// Called before each dispatch attempt (1-based)
    fn on_tool_dispatch(&self, _call: &ToolCall, _attempt: u32) {}

    /// Called once the final result of a dispatch is known
    fn on_tool_complete(&self, _result: &ToolResult) {}

    /// Called after the turn has been recorded
    fn on_turn_complete(&self, _turn: &Turn) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoTurnProgress;

impl TurnProgressNotifier for NoTurnProgress {}
