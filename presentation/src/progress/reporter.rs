//! Progress reporting for a running turn

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sre_application::{NoTurnProgress, TurnProgressNotifier};
use sre_domain::{ToolCall, ToolResult, Turn, TurnPhase};
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

/// What the user sees while the turn is in `phase`; `None` keeps the
/// previous message.
fn phase_message(phase: TurnPhase) -> Option<&'static str> {
    match phase {
        TurnPhase::AwaitingModelPlan => Some("Thinking..."),
        TurnPhase::Normalizing => Some("Preparing tool call..."),
        TurnPhase::Dispatching => Some("Calling tool..."),
        TurnPhase::Unwrapping => Some("Reading tool response..."),
        TurnPhase::AwaitingModelSummary => Some("Summarizing..."),
        TurnPhase::AwaitingFinalText => Some("Writing answer..."),
        TurnPhase::Idle
        | TurnPhase::NoToolDetected
        | TurnPhase::ToolDetected
        | TurnPhase::Done => None,
    }
}

fn dispatch_message(call: &ToolCall, attempt: u32) -> String {
    if attempt > 1 {
        format!("Calling {} (attempt {})...", call.tool_name, attempt)
    } else {
        format!("Calling {}...", call.tool_name)
    }
}

fn result_line(result: &ToolResult) -> String {
    let duration = result
        .metadata
        .duration_ms
        .map(|ms| format!(" ({} ms)", ms))
        .unwrap_or_default();
    match result.failure_ref() {
        None => format!("{} {}{}", "v".green(), result.tool_name, duration.dimmed()),
        Some(failure) => format!(
            "{} {}{}: {}",
            "x".red(),
            result.tool_name,
            duration.dimmed(),
            failure.kind.label()
        ),
    }
}

/// Reports progress with a spinner on stderr
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let spinner = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        f(spinner);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnProgressNotifier for ProgressReporter {
    fn on_phase(&self, phase: TurnPhase) {
        if let Some(message) = phase_message(phase) {
            self.with_spinner(|pb| pb.set_message(message));
        }
    }

    fn on_tool_dispatch(&self, call: &ToolCall, attempt: u32) {
        self.with_spinner(|pb| pb.set_message(dispatch_message(call, attempt)));
    }

    fn on_tool_complete(&self, result: &ToolResult) {
        self.with_spinner(|pb| pb.println(result_line(result)));
    }

    fn on_turn_complete(&self, _turn: &Turn) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Simple text-based progress (no fancy UI), for non-terminal stderr
pub struct SimpleProgress;

impl TurnProgressNotifier for SimpleProgress {
    fn on_phase(&self, phase: TurnPhase) {
        if let Some(message) = phase_message(phase) {
            eprintln!("{} {}", "->".cyan(), message);
        }
    }

    fn on_tool_dispatch(&self, call: &ToolCall, attempt: u32) {
        eprintln!("{} {}", "->".cyan(), dispatch_message(call, attempt));
    }

    fn on_tool_complete(&self, result: &ToolResult) {
        eprintln!("  {}", result_line(result));
    }
}

/// Spinner on an interactive stderr, plain lines otherwise, nothing when
/// progress is turned off.
pub fn progress_for(show_progress: bool) -> Box<dyn TurnProgressNotifier> {
    if !show_progress {
        Box::new(NoTurnProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    }
}
