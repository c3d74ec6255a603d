//! Application layer for sre-assistant
//!
//! This crate contains the conversation orchestrator, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::TurnParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoTurnProgress, TurnProgressNotifier},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::run_turn::{ConversationSession, TurnError, TurnOutput};
