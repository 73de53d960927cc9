//! CLI argument definitions, error mapping and output envelopes.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Success exit code.
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code.
pub const EXIT_CONFIG: i32 = 2;
/// Runtime error exit code (fetch, render, I/O, plan assembly).
pub const EXIT_RUN: i32 = 3;

/// CLI-facing error type with exit-code mapping.
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration or usage error (exit code 2).
    #[error("configuration error: {message}")]
    #[diagnostic(code(dockforge::cli::config))]
    Config {
        /// The error message.
        message: String,
        /// Optional help text.
        #[help]
        help: Option<String>,
    },

    /// Runtime error (exit code 3).
    #[error("{message}")]
    #[diagnostic(code(dockforge::cli::run))]
    Run {
        /// The error message.
        message: String,
        /// Optional help text.
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text.
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a runtime error.
    #[must_use]
    pub fn run(message: impl Into<String>) -> Self {
        Self::Run {
            message: message.into(),
            help: None,
        }
    }

    /// Create a runtime error with help text.
    #[must_use]
    pub fn run_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Run {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<dockforge_core::Error> for CliError {
    fn from(err: dockforge_core::Error) -> Self {
        use dockforge_core::Error;
        match err {
            Error::MissingSourceMapping { .. }
            | Error::UnknownLatestVersion { .. }
            | Error::DuplicateAxisValue { .. }
            | Error::Configuration { .. } => Self::config(err.to_string()),
            Error::Io { .. } | Error::Serialization { .. } => Self::run(err.to_string()),
        }
    }
}

impl From<dockforge_plan::Error> for CliError {
    fn from(err: dockforge_plan::Error) -> Self {
        match err {
            dockforge_plan::Error::Core(core) => core.into(),
            other => Self::run(other.to_string()),
        }
    }
}

impl From<dockforge_generate::Error> for CliError {
    fn from(err: dockforge_generate::Error) -> Self {
        match err {
            dockforge_generate::Error::Core(core) => core.into(),
            other => Self::run(other.to_string()),
        }
    }
}

/// Map a CLI error to its exit code.
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CONFIG,
        CliError::Run { .. } => EXIT_RUN,
    }
}

/// Render an error as a miette report or a JSON envelope.
pub fn render_error(err: CliError, json_mode: bool) {
    if json_mode {
        let envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match &err {
                CliError::Config { .. } => "config",
                CliError::Run { .. } => "run",
            },
            "message": err.to_string(),
        }));
        match serde_json::to_string(&envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("error serializing error response"),
        }
    } else {
        let report = Report::new(err);
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Always `ok`.
    pub status: &'static str,
    /// The data payload.
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Always `error`.
    pub status: &'static str,
    /// The error details.
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope.
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Main CLI entry point for dockforge.
#[derive(Parser, Debug)]
#[command(name = "dockforge")]
#[command(about = "Build-matrix orchestrator for container images")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level.
    #[arg(short = 'L', long, global = true, default_value = "warn", value_enum)]
    pub level: crate::logging::LogLevel,

    /// Emit JSON envelopes instead of human-readable output.
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a matrix configuration file (JSON).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble the build-matrix plan and emit it as JSON.
    #[command(about = "Assemble the build-matrix plan and emit it as JSON")]
    Plan {
        /// Write the plan to a file instead of stdout.
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Generate configuration artifacts for the matrix.
    #[command(about = "Generate configuration artifacts for the matrix")]
    Generate {
        /// Restrict generation to one runtime version.
        #[arg(long, value_name = "VERSION")]
        runtime: Option<String>,

        /// Restrict generation to one OS variant.
        #[arg(long, value_name = "VARIANT")]
        variant: Option<String>,

        /// Which generation strategy to run.
        #[arg(long, value_enum, default_value_t = StrategyArg::All)]
        strategy: StrategyArg,
    },

    /// List every target and shortcut basename.
    #[command(about = "List every target and shortcut basename")]
    List,
}

/// Strategy selection for the `generate` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Only the upstream-transform artifacts.
    Transform,
    /// Only the template-rendered artifacts.
    Template,
    /// Both strategies.
    All,
}

impl StrategyArg {
    /// Whether the transform strategy is selected.
    #[must_use]
    pub fn includes_transform(self) -> bool {
        matches!(self, Self::Transform | Self::All)
    }

    /// Whether the template strategy is selected.
    #[must_use]
    pub fn includes_template(self) -> bool {
        matches!(self, Self::Template | Self::All)
    }
}

/// Parse CLI arguments from the process environment.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
