//! CLI entrypoint for sre-assistant
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use sre_application::ConversationSession;
use sre_domain::Utterance;
use sre_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, McpToolExecutor, OllamaGateway,
    default_tool_spec,
};
use sre_presentation::{ChatRepl, Cli, ConsoleFormatter, ReplConfig, progress_for};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);

    // Keep the guard alive until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.verbose, config.logging.log_dir.as_deref());

    info!("Starting sre-assistant");

    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            error!("Invalid configuration: {}", problem);
        }
        bail!(
            "Invalid configuration: {}",
            problems
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        );
    }
    let params = config.turn_params()?;

    // === Dependency Injection ===
    let gateway = OllamaGateway::new(
        &config.model.host,
        config.model.name.clone(),
        Duration::from_secs(config.model.timeout_seconds),
    )?
    .with_temperature(config.model.temperature);

    let tool_executor = McpToolExecutor::new(default_tool_spec(), config.tool_server.to_process());
    info!("Tool server: {}", tool_executor.process().command_line());

    let mut session = ConversationSession::new(Arc::new(gateway), Arc::new(tool_executor), params);
    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::new(path) {
            Some(logger) => session = session.with_conversation_logger(Arc::new(logger)),
            None => warn!("Continuing without a conversation transcript"),
        }
    }

    let show_progress = !cli.quiet && config.repl.show_progress;

    // One-shot mode
    if let Some(question) = cli.question {
        let utterance = Utterance::try_new(question).context("Nothing to ask")?;
        let progress = progress_for(show_progress);
        let output = session.run_turn(utterance, progress.as_ref()).await;
        println!("{}", ConsoleFormatter::format_turn(&output));

        return Ok(if output.is_failure() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    // Chat mode
    let repl_config = ReplConfig {
        show_progress,
        history_file: config
            .repl
            .history_file
            .as_ref()
            .map(PathBuf::from)
            .or_else(ConfigLoader::default_history_path),
    };
    let mut repl = ChatRepl::new(session, config.model.name.clone()).with_config(repl_config);
    repl.run().await?;

    Ok(ExitCode::SUCCESS)
}

/// Command-line flags take precedence over every configuration source.
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(host) = &cli.host {
        config.model.host = host.clone();
    }
    if let Some(seconds) = cli.tool_timeout {
        config.tool_server.timeout_seconds = seconds;
    }
}

/// Console logs go to stderr at a level chosen by `-v` (`RUST_LOG` wins when
/// set). With a log directory, a daily rolling file receives the same events.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "sre-assistant.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    guard
}
