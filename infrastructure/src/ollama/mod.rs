//! Ollama model gateway
//!
//! Talks to a local Ollama server over HTTP (`POST /api/chat`, non-streaming).

pub mod gateway;
pub mod protocol;

pub use gateway::{DEFAULT_HOST, DEFAULT_MODEL, OllamaGateway, normalize_host};
