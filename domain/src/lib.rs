//! Domain layer for sre-assistant
//!
//! This crate contains the core logic of the tool-call orchestration:
//! entities, value objects and the pure transforms between them. It has no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tool calls
//!
//! - **Scanner**: finds the JSON region in free-form model output
//! - **Normalizer**: repairs and validates it into a [`ToolCall`], applying
//!   the alert-intent filter policy
//!
//! ## Turns
//!
//! A [`Turn`] walks the phases from `Idle` to `Done` and is recorded into
//! the session [`History`] once complete.

pub mod call;
pub mod core;
pub mod prompt;
pub mod session;
pub mod tool;
pub mod turn;
pub mod util;

// Re-export commonly used types
pub use call::{
    AlertIntentPolicy, CallNormalizer, FilterPolicy, NormalizeError, scan,
    normalizer::ALERT_STATE,
};
pub use core::{error::DomainError, utterance::Utterance};
pub use prompt::PromptTemplate;
pub use session::entities::{History, Message, Role};
pub use tool::{
    FailureStage, ParamType, ToolCall, ToolDefinition, ToolFailure, ToolFailureKind,
    ToolParameter, ToolPayload, ToolResult, ToolResultMetadata, ToolSpec, ToolStatus,
};
pub use turn::{Turn, TurnOutcome, TurnPhase};
