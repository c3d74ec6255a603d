//! Console output formatter for assistant turns

use colored::Colorize;
use sre_application::TurnOutput;
use sre_domain::{History, ToolSpec, TurnOutcome};

/// Formats turns, tools and session state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner shown when the chat REPL starts
    pub fn welcome(model: &str, tools: &ToolSpec) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str(&Self::header("SRE Assistant - Chat Mode"));
        output.push_str("\n\n");
        output.push_str(&format!("{} {}\n", "Model:".cyan().bold(), model));
        output.push_str(&format!(
            "{} {}\n\n",
            "Tools:".cyan().bold(),
            Self::tool_names(tools).join(", ")
        ));
        output.push_str(&Self::help());
        output
    }

    /// Help text for the REPL commands
    pub fn help() -> String {
        let mut output = format!("{}\n", "Commands:".bold());
        for (cmd, desc) in [
            ("/help", "Show this help"),
            ("/tools", "List available tools"),
            ("/history", "Show turns so far"),
            ("/quit", "Exit chat (also: exit, quit, Ctrl-D)"),
        ] {
            output.push_str(&format!("  {:<10} - {}\n", cmd.cyan(), desc));
        }
        output
    }

    /// Format the answer of one turn, flagging failures
    pub fn format_turn(output: &TurnOutput) -> String {
        let mut text = String::new();

        match &output.turn.outcome {
            TurnOutcome::ToolFailed(failure) => {
                text.push_str(&format!(
                    "{} {}\n\n",
                    "x".red().bold(),
                    failure.to_string().dimmed()
                ));
            }
            TurnOutcome::ModelUnavailable { message } => {
                text.push_str(&format!("{} {}\n\n", "x".red().bold(), message.dimmed()));
            }
            TurnOutcome::MalformedCall { reason } => {
                text.push_str(&format!(
                    "{} {}\n\n",
                    "!".yellow().bold(),
                    format!("tool call not understood: {}", reason).dimmed()
                ));
            }
            TurnOutcome::Answered | TurnOutcome::Summarized => {}
        }

        text.push_str(output.answer().trim_end());
        text
    }

    /// List the registered tools with their parameters
    pub fn format_tools(tools: &ToolSpec) -> String {
        let mut definitions: Vec<_> = tools.all().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));

        let mut output = format!("{}\n", "Available tools:".cyan().bold());
        for def in definitions {
            output.push_str(&format!("  {} - {}\n", def.name.yellow().bold(), def.description));
            for param in &def.parameters {
                let marker = if param.state_filter { " (state filter)" } else { "" };
                output.push_str(&format!(
                    "      {}: {}{}\n",
                    param.name,
                    param.param_type.as_str().dimmed(),
                    marker
                ));
            }
        }
        output
    }

    /// One line per recorded turn
    pub fn format_history(history: &History) -> String {
        if history.is_empty() {
            return "No turns yet.".dimmed().to_string();
        }

        let mut output = format!(
            "{} {}\n",
            "Turns:".cyan().bold(),
            history.turn_count()
        );
        for (i, turn) in history.turns().iter().enumerate() {
            let tool = turn
                .invocation
                .as_ref()
                .map(|call| format!(" [{}]", call.tool_name))
                .unwrap_or_default();
            let outcome = if turn.outcome.is_failure() {
                turn.outcome.as_str().red().to_string()
            } else {
                turn.outcome.as_str().green().to_string()
            };
            output.push_str(&format!(
                "  {}. {}{} -> {}\n",
                i + 1,
                Self::truncate(&turn.utterance, 60),
                tool,
                outcome
            ));
        }
        output
    }

    fn tool_names(tools: &ToolSpec) -> Vec<&str> {
        let mut names: Vec<&str> = tools.names().collect();
        names.sort_unstable();
        names
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(50);
        format!("{}\n{:^50}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
