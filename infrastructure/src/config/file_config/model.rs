//! Model configuration from TOML (`[model]` section)

use crate::ollama::{DEFAULT_HOST, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};

/// Raw model configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Ollama model tag
    pub name: String,
    /// Ollama base URL (`host:port` is accepted)
    pub host: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Sampling temperature; the model's own default when unset
    pub temperature: Option<f32>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            timeout_seconds: 120,
            temperature: None,
        }
    }
}
