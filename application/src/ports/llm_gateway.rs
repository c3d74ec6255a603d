//! LLM Gateway port
//!
//! Defines the interface for communicating with the language model.

use async_trait::async_trait;
use sre_domain::Message;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
///
/// Every variant means the model is unavailable for this turn; none of
/// them is ever turned into an empty answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Gateway for LLM communication
///
/// One request/response call per invocation: the system instructions plus
/// the ordered conversation messages in, generated text out.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Name of the model this gateway talks to
    fn model_name(&self) -> &str;

    /// Send the conversation and return the model's reply
    async fn chat(&self, system: &str, messages: &[Message]) -> Result<String, GatewayError>;
}
