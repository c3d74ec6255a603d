//! Wire types for Ollama's `/api/chat` endpoint (non-streaming).

use serde::{Deserialize, Serialize};
use sre_domain::{Message, Role};

/// Request body for `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
}

impl<'a> ChatRequest<'a> {
    /// System instructions first, then the conversation in order.
    pub fn new(model: &'a str, system: &'a str, messages: &'a [Message]) -> Self {
        let messages = std::iter::once(ChatMessage {
            role: Role::System.as_str(),
            content: system,
        })
        .chain(messages.iter().map(|m| ChatMessage {
            role: m.role.as_str(),
            content: &m.content,
        }))
        .collect();

        Self {
            model,
            messages,
            stream: false,
            options: None,
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        if !options.is_empty() {
            self.options = Some(options);
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Sampling options forwarded to the model
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatOptions {
    fn is_empty(&self) -> bool {
        self.temperature.is_none()
    }
}

/// Response body for a non-streaming chat
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub message: ResponseMessage,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    pub content: String,
}

/// Error body Ollama returns with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
