//! Tracing initialization for the CLI.

use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log level options for the CLI.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevel {
    /// Show all logs (trace level).
    Trace,
    /// Show debug and above.
    Debug,
    /// Show info and above.
    Info,
    /// Show warnings and above (default).
    Warn,
    /// Show errors only.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Initialize tracing on stderr.
///
/// `RUST_LOG` takes precedence over the CLI level; already-initialized
/// subscribers (e.g. in tests) are left untouched.
pub fn init(level: LogLevel, json: bool) {
    let level_str = match Level::from(level) {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "dockforge={level_str},dockforge_core={level_str},dockforge_generate={level_str},dockforge_plan={level_str},dockforge_task_graph={level_str}"
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        let _ = registry.with(layer).try_init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false);
        let _ = registry.with(layer).try_init();
    }
}
