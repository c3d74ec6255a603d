//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface for the assistant.

mod repl;

pub use repl::{ChatRepl, ReplCommand, ReplInput};
