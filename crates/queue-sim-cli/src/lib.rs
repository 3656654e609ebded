//! # Queue Sim CLI
//!
//! Command-line driver for the in-memory queue broker.
//!
//! This module provides CLI commands for:
//! - Running a stream of JSON commands against one broker instance
//! - Showing the resolved configuration
//!
//! Each input line of `run` is one command object, for example
//! `{"action": "SendMessage", "queueName": "orders", "body": "hello"}`.
//! Each output line is either `{"ok": <response envelope>}` or
//! `{"error": {"code": ..., "message": ...}}`.

use clap::{Parser, Subcommand};
use queue_sim::{BrokerConfig, BrokerError, Command, InMemoryBroker, QueueService, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "QUEUE_SIM";

// ============================================================================
// CLI Structure
// ============================================================================

/// Queue Sim - in-process message queue broker
#[derive(Parser)]
#[command(name = "queue-sim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-process message queue broker simulator")]
#[command(
    long_about = "Queue Sim runs queue commands against an in-memory broker with ordered, at-least-once delivery"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "QUEUE_SIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level, overrides the configured level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Execute JSON commands, one per line
    Run {
        /// File to read commands from (stdin when absent)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Pretty-print each result
        #[arg(short, long)]
        pretty: bool,

        /// Exit with an error when any command fails
        #[arg(long)]
        strict: bool,
    },

    /// Show the resolved configuration
    Config,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Logging initialization failed: {message}")]
    Logging { message: String },

    #[error("{failed} of {total} commands failed")]
    CommandFailed { failed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output encoding failed: {0}")]
    Output(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    InvalidFormat(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// ============================================================================
// Configuration Types
// ============================================================================

/// CLI configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Broker limits
    pub broker: BrokerConfig,
    /// Default logging configuration
    pub logging: LoggingConfig,
}

impl CliConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.broker.validate()?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Json,
}

/// Totals for one `run` invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    // Configuration decides the log format, so it is loaded first
    let config = load_configuration(cli.config.as_deref())?;

    initialize_logging(&cli, &config.logging)?;
    debug!(config = ?config, "Loaded configuration");

    match cli.command {
        Commands::Run {
            input,
            pretty,
            strict,
        } => execute_run_command(input, pretty, strict, &config).await,
        Commands::Config => execute_config_command(&config).await,
    }
}

// ============================================================================
// Logging and Configuration
// ============================================================================

/// Initialize logging based on CLI arguments and configuration.
///
/// `RUST_LOG` wins over `--log-level`, which wins over the configured level.
/// Logs are written to stderr so that stdout carries only command results.
pub fn initialize_logging(cli: &Cli, logging: &LoggingConfig) -> Result<(), CliError> {
    let level = cli.log_level.as_deref().unwrap_or(&logging.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let json = cli.json_logs || logging.format == LogFormat::Json;
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })
}

/// Load configuration from an optional file and the process environment
pub fn load_configuration(config_path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    build_configuration(config_path, None)
}

/// Load configuration from an optional file and an environment source.
///
/// Sources are applied in order, later ones overriding earlier ones:
///  1. Built-in defaults
///  2. The configuration file, format inferred from its extension
///  3. Variables prefixed `QUEUE_SIM__`, e.g.
///     `QUEUE_SIM__BROKER__MAX_RECEIVE_COUNT=5`
///
/// `environment` replaces the process environment when given.
pub fn build_configuration(
    config_path: Option<&Path>,
    environment: Option<HashMap<String, String>>,
) -> Result<CliConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config: CliConfig = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(environment),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

// ============================================================================
// Command Processing
// ============================================================================

/// Execute one JSON command line and encode its result.
///
/// Returns the encoded result and whether the command succeeded. Failures,
/// including undecodable input, are reported in the result rather than
/// returned as errors.
pub async fn process_line<S: QueueService + ?Sized>(
    broker: &S,
    line: &str,
) -> (serde_json::Value, bool) {
    let result = match Command::from_json(line) {
        Ok(command) => {
            debug!(action = command.action(), queue = command.queue_name(), "Dispatching command");
            broker.dispatch(command).await
        }
        Err(e) => Err(e),
    };

    match result.and_then(|response| Ok(serde_json::to_value(response)?)) {
        Ok(envelope) => (serde_json::json!({ "ok": envelope }), true),
        Err(e) => (error_result(&e), false),
    }
}

fn error_result(error: &BrokerError) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": error.code(),
            "message": error.to_string(),
        }
    })
}

/// Run every non-blank line from `reader` through the broker, writing one
/// result line per command to `writer`.
pub async fn run_commands<S, R, W>(
    broker: &S,
    reader: R,
    writer: &mut W,
    pretty: bool,
) -> Result<RunSummary, CliError>
where
    S: QueueService + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = RunSummary::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (result, ok) = process_line(broker, line).await;
        summary.processed += 1;
        if !ok {
            summary.failed += 1;
        }

        let encoded = if pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };
        writer.write_all(encoded.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    Ok(summary)
}

/// Execute run command
async fn execute_run_command(
    input: Option<PathBuf>,
    pretty: bool,
    strict: bool,
    config: &CliConfig,
) -> Result<(), CliError> {
    info!(input = ?input, pretty, strict, "Running commands");

    let broker = InMemoryBroker::new(config.broker.clone());
    let mut stdout = tokio::io::stdout();

    let summary = match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await?;
            run_commands(&broker, BufReader::new(file), &mut stdout, pretty).await?
        }
        None => {
            run_commands(&broker, BufReader::new(tokio::io::stdin()), &mut stdout, pretty).await?
        }
    };

    info!(
        processed = summary.processed,
        failed = summary.failed,
        queues = broker.list_queues().await.len(),
        "Finished running commands"
    );

    if strict && summary.failed > 0 {
        warn!(failed = summary.failed, "Commands failed in strict mode");
        return Err(CliError::CommandFailed {
            failed: summary.failed,
            total: summary.processed,
        });
    }

    Ok(())
}

/// Execute config command
async fn execute_config_command(config: &CliConfig) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(config)?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(encoded.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
