//! Presentation layer for sre-assistant
//!
//! This crate contains the CLI definition, the interactive chat REPL,
//! console formatting and progress reporters.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::Cli;
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress, progress_for};
