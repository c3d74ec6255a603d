//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for sre-assistant
#[derive(Parser, Debug)]
#[command(name = "sre-assistant")]
#[command(author, version, about = "Chat with a local model that can query Datadog through an MCP server")]
#[command(long_about = r#"
sre-assistant answers operational questions with a local Ollama model.
When the model asks for data, the assistant runs the Datadog MCP server,
passes the result back and prints the model's summary.

Configuration files are loaded from (in priority order):
1. SRE_ASSISTANT_<SECTION>__<KEY>   Environment variables
2. --config <path>                  Explicit config file
3. ./sre-assistant.toml             Project-level config
4. ~/.config/sre-assistant/config.toml   Global config

Example:
  sre-assistant "show me all monitors in alert state"
  sre-assistant --model llama3:8b
  sre-assistant -vv --tool-timeout 30
"#)]
pub struct Cli {
    /// Ask one question and exit (starts the chat REPL when omitted)
    pub question: Option<String>,

    /// Ollama model to use (overrides config)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Ollama host, e.g. http://127.0.0.1:11434 (overrides config)
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Seconds to wait for the tool server (overrides config)
    #[arg(long, value_name = "SECONDS")]
    pub tool_timeout: Option<u64>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_starts_chat() {
        let cli = Cli::try_parse_from(["sre-assistant"]).unwrap();
        assert!(cli.question.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_one_shot_with_overrides() {
        let cli = Cli::try_parse_from([
            "sre-assistant",
            "-vv",
            "--model",
            "llama3:8b",
            "--tool-timeout",
            "30",
            "list alerts",
        ])
        .unwrap();
        assert_eq!(cli.question.as_deref(), Some("list alerts"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.as_deref(), Some("llama3:8b"));
        assert_eq!(cli.tool_timeout, Some(30));
    }

    #[test]
    fn test_config_conflicts_with_no_config() {
        let result =
            Cli::try_parse_from(["sre-assistant", "--config", "x.toml", "--no-config"]);
        assert!(result.is_err());
    }
}
