//! dockforge CLI application.
//!
//! Generates a build-matrix plan for container images (the cross product of
//! an OS-variant axis and a runtime-version axis), runs the configuration
//! artifact generators, and lists the resulting targets. Plan execution is
//! delegated to an external task engine; this binary only emits the plan
//! and produces the artifacts it references.

// The CLI intentionally writes results to stdout.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod logging;

use cli::{Cli, CliError, Commands, EXIT_OK, exit_code_for, render_error};
use dockforge_core::MatrixConfig;

fn main() {
    let cli = cli::parse();
    logging::init(cli.level, cli.json);

    let json_mode = cli.json;
    let exit_code = match run(cli) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            let code = exit_code_for(&err);
            render_error(err, json_mode);
            code
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => MatrixConfig::load(path)?,
        None => {
            let config = MatrixConfig::default();
            config.validate()?;
            config
        }
    };

    let Some(command) = cli.command else {
        return Err(CliError::config_with_help(
            "no subcommand provided",
            "run 'dockforge --help' for usage information",
        ));
    };

    match command {
        Commands::Plan { output } => commands::plan::execute(&config, output.as_deref(), cli.json),

        Commands::List => commands::list::execute(&config, cli.json),

        // Only artifact generation needs the async runtime; plan and list
        // stay on the fast synchronous path.
        Commands::Generate {
            runtime,
            variant,
            strategy,
        } => {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| CliError::run(format!("failed to create tokio runtime: {e}")))?;

            let root = std::env::current_dir()
                .map_err(|e| CliError::run(format!("failed to resolve working directory: {e}")))?;
            let filter = commands::generate::GenerateFilter { runtime, variant };

            rt.block_on(commands::generate::execute(
                &config, &root, &filter, strategy, cli.json,
            ))
        }
    }
}
