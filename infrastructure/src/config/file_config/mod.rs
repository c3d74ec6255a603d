//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application and
//! infrastructure types at startup.

mod intent;
mod logging;
mod model;
mod repl;
mod tool_server;

pub use intent::FileIntentConfig;
pub use logging::FileLoggingConfig;
pub use model::FileModelConfig;
pub use repl::FileReplConfig;
pub use tool_server::FileToolServerConfig;

use serde::{Deserialize, Serialize};
use sre_application::TurnParams;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("{field} cannot be 0")]
    InvalidTimeout { field: &'static str },

    #[error("model.name cannot be empty")]
    EmptyModelName,

    #[error("tool_server.command cannot be empty")]
    EmptyCommand,

    #[error("tool_server.max_dispatch_attempts must be at least 1")]
    NoDispatchAttempts,

    #[error("intent.{field} cannot be empty")]
    EmptyIntentVocabulary { field: &'static str },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Ollama model settings
    pub model: FileModelConfig,
    /// MCP tool server launch settings
    pub tool_server: FileToolServerConfig,
    /// Alert intent vocabulary and state filter defaults
    pub intent: FileIntentConfig,
    /// Transcript and diagnostic log locations
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.model.timeout_seconds == 0 {
            errors.push(ConfigValidationError::InvalidTimeout {
                field: "model.timeout_seconds",
            });
        }
        if self.model.name.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyModelName);
        }

        if self.tool_server.timeout_seconds == 0 {
            errors.push(ConfigValidationError::InvalidTimeout {
                field: "tool_server.timeout_seconds",
            });
        }
        if self.tool_server.command.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyCommand);
        }
        if self.tool_server.max_dispatch_attempts == 0 {
            errors.push(ConfigValidationError::NoDispatchAttempts);
        }

        if self.intent.verbs.iter().all(|v| v.trim().is_empty()) {
            errors.push(ConfigValidationError::EmptyIntentVocabulary { field: "verbs" });
        }
        if self.intent.keywords.iter().all(|k| k.trim().is_empty()) {
            errors.push(ConfigValidationError::EmptyIntentVocabulary { field: "keywords" });
        }

        errors
    }

    /// Turn parameters for the orchestrator. Call after [`validate`](Self::validate).
    pub fn turn_params(&self) -> Result<TurnParams, ConfigValidationError> {
        let intent = self.intent.to_policy().map_err(|_| {
            ConfigValidationError::EmptyIntentVocabulary {
                field: if self.intent.verbs.iter().all(|v| v.trim().is_empty()) {
                    "verbs"
                } else {
                    "keywords"
                },
            }
        })?;

        Ok(TurnParams::default()
            .with_max_dispatch_attempts(self.tool_server.max_dispatch_attempts)
            .with_intent(intent)
            .with_filter(self.intent.to_filter()))
    }
}
