//! Infrastructure layer for sre-assistant
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.
//!
//! - [`ollama`]: [`OllamaGateway`], the model gateway
//! - [`mcp`]: [`McpToolExecutor`], the per-call MCP tool process bridge
//! - [`tools`]: the registered Datadog tool set
//! - [`logging`]: [`JsonlConversationLogger`]
//! - [`config`]: figment-based [`ConfigLoader`]

pub mod config;
pub mod logging;
pub mod mcp;
pub mod ollama;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileIntentConfig, FileLoggingConfig,
    FileModelConfig, FileReplConfig, FileToolServerConfig,
};
pub use logging::JsonlConversationLogger;
pub use mcp::{McpError, McpToolExecutor, ToolProcess};
pub use ollama::OllamaGateway;
pub use tools::default_tool_spec;
