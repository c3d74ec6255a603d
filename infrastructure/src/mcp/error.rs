//! Error types for the MCP tool process bridge

use sre_domain::{ToolFailure, ToolFailureKind};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur while exchanging one request with the tool process
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to spawn tool process '{command}': {source}")]
    SpawnError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write request to tool process: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("Failed to read tool process output: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("No response from tool process within {0:?}")]
    Timeout(Duration),

    #[error("Tool process exited with {}: {stderr}", exit_label(.code))]
    ProcessExited { code: Option<i32>, stderr: String },

    #[error("Tool process produced no output")]
    EmptyOutput { stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

impl McpError {
    /// Classify as a dispatch-stage [`ToolFailure`].
    pub fn into_failure(self) -> ToolFailure {
        let message = self.to_string();
        match self {
            McpError::SpawnError { .. } => ToolFailure::spawn_failed(message),
            McpError::SerializationError(_) | McpError::WriteError(_) => {
                ToolFailure::write_failed(message)
            }
            McpError::Timeout(after) => ToolFailure::timeout(after.as_millis() as u64),
            // A read error ends the exchange the same way a dead process does.
            McpError::ReadError(_) => {
                ToolFailure::new(ToolFailureKind::ProcessExited { code: None }, message)
            }
            McpError::ProcessExited { code, .. } => {
                ToolFailure::new(ToolFailureKind::ProcessExited { code }, message)
            }
            McpError::EmptyOutput { .. } => {
                ToolFailure::new(ToolFailureKind::EmptyOutput, message)
            }
        }
    }
}
