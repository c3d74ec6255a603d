//! Prompt domain
//!
//! Templates for the system prompt and the messages exchanged around a tool call.

mod template;

pub use template::PromptTemplate;
