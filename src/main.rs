//! dsconfig-sync: declarative directory-server configuration
//!
//! Entry point for the dsconfig-sync application.

use dsconfig_sync::config::{Cli, Command, ValidatedConfig, write_default_config};
use dsconfig_sync::registry::Registry;
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};
use run::Task;

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // init and variants never talk to a server
    let Some(task) = Task::from_command(&cli.command) else {
        return run_local(&cli.command);
    };

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    tracing::info!("{config}");

    run_application(config, task)
}

/// Handles the subcommands that need no server configuration.
fn run_local(command: &Command) -> ExitCode {
    match command {
        Command::Init { output } => handle_init(output),
        Command::Variants { family } => handle_variants(family.as_deref()),
        _ => exit_code::SUCCESS,
    }
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Handles the `variants` subcommand.
fn handle_variants(family: Option<&str>) -> ExitCode {
    let mut out = std::io::stdout().lock();
    match run::describe_variants(&Registry::builtin(), family, &mut out) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Runs a remote task with the given configuration.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(config: ValidatedConfig, task: Task) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(config, task)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) if e.is_config_error() => {
            tracing::error!("{e}");
            exit_code::CONFIG_ERROR
        }
        Err(e) => {
            tracing::error!("Application error: {e}");
            exit_code::runtime_error()
        }
    }
}
