//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::config::ReplConfig;
use crate::progress::reporter::progress_for;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use sre_application::ConversationSession;
use sre_domain::Utterance;
use tracing::debug;

/// Words that end the session when typed on their own
const EXIT_WORDS: [&str; 5] = ["exit", "quit", "/quit", "/exit", "/q"];

/// Local REPL commands, never sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Tools,
    History,
    Unknown(String),
}

/// One line of user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Exit,
    Command(ReplCommand),
    Question(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        if EXIT_WORDS.iter().any(|w| w.eq_ignore_ascii_case(line)) {
            return ReplInput::Exit;
        }
        if line.starts_with('/') {
            let command = match line {
                "/help" | "/h" | "/?" => ReplCommand::Help,
                "/tools" => ReplCommand::Tools,
                "/history" => ReplCommand::History,
                other => ReplCommand::Unknown(other.to_string()),
            };
            return ReplInput::Command(command);
        }
        ReplInput::Question(line.to_string())
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    session: ConversationSession,
    model: String,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(session: ConversationSession, model: impl Into<String>) -> Self {
        Self {
            session,
            model: model.into(),
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.config.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        println!(
            "{}",
            ConsoleFormatter::welcome(&self.model, self.session.tool_executor().tool_spec())
        );

        loop {
            let readline = rl.readline(&format!("{} ", "sre>".green().bold()));

            match readline {
                Ok(line) => match ReplInput::parse(&line) {
                    ReplInput::Empty => continue,
                    ReplInput::Exit => {
                        println!("Bye!");
                        break;
                    }
                    ReplInput::Command(command) => self.handle_command(command),
                    ReplInput::Question(question) => {
                        let _ = rl.add_history_entry(question.as_str());
                        self.process_question(question).await;
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C discards the current line only
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.config.history_file {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn handle_command(&self, command: ReplCommand) {
        println!();
        match command {
            ReplCommand::Help => print!("{}", ConsoleFormatter::help()),
            ReplCommand::Tools => print!(
                "{}",
                ConsoleFormatter::format_tools(self.session.tool_executor().tool_spec())
            ),
            ReplCommand::History => {
                println!("{}", ConsoleFormatter::format_history(self.session.history()))
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        println!();
    }

    async fn process_question(&mut self, question: String) {
        let Ok(utterance) = Utterance::try_new(question) else {
            return;
        };
        println!();

        let progress = progress_for(self.config.show_progress);
        let output = self.session.run_turn(utterance, progress.as_ref()).await;
        debug!(
            "Turn finished: {} ({} phases)",
            output.turn.outcome.as_str(),
            output.turn.phases.len()
        );

        println!("{}", ConsoleFormatter::format_turn(&output));
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        for word in ["exit", "quit", "QUIT", "  exit  ", "/quit", "/exit", "/q"] {
            assert_eq!(ReplInput::parse(word), ReplInput::Exit, "{word}");
        }
    }

    #[test]
    fn test_exit_word_inside_question_is_a_question() {
        assert_eq!(
            ReplInput::parse("how do I exit vim"),
            ReplInput::Question("how do I exit vim".to_string())
        );
    }

    #[test]
    fn test_commands() {
        assert_eq!(ReplInput::parse("/help"), ReplInput::Command(ReplCommand::Help));
        assert_eq!(ReplInput::parse("/?"), ReplInput::Command(ReplCommand::Help));
        assert_eq!(ReplInput::parse("/tools"), ReplInput::Command(ReplCommand::Tools));
        assert_eq!(
            ReplInput::parse("/history"),
            ReplInput::Command(ReplCommand::History)
        );
        assert_eq!(
            ReplInput::parse("/council"),
            ReplInput::Command(ReplCommand::Unknown("/council".to_string()))
        );
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        assert_eq!(ReplInput::parse(""), ReplInput::Empty);
        assert_eq!(ReplInput::parse("   \t"), ReplInput::Empty);
    }

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(
            ReplInput::parse("  show me alerts \n"),
            ReplInput::Question("show me alerts".to_string())
        );
    }
}
