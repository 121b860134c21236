//! CLI entry point and dispatch logic: parse arguments, resolve config,
//! build the engine, dispatch to a command, and report any error the
//! uniform way (`UserFriendlyError` message, context, suggestions) before
//! mapping it to a process exit code.

use std::path::PathBuf;

use acp_config::{CliOverrides, Config};
use acp_engine::{Engine, EngineError};
use acp_utils::{AcpError, UserFriendlyError};
use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

/// Parses arguments, runs the selected command, and reports on failure.
/// Returns the process exit code to use; `main` only maps this to
/// `std::process::exit`.
#[must_use]
pub fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(err) = acp_utils::logging::init_tracing(cli.verbose) {
        // A subscriber is already installed (e.g. under a test harness);
        // this is never fatal.
        tracing::debug!(error = %err, "tracing subscriber not installed");
    }

    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = match resolve_config(&cli, &root) {
        Ok(config) => config,
        Err(err) => {
            report(&err, cli.quiet);
            return err.to_exit_code();
        }
    };
    let engine = Engine::new(root, config);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            return 2;
        }
    };

    let result = rt.block_on(dispatch(&cli, &engine));

    match result {
        Ok(()) => 0,
        Err(err) => {
            let err: AcpError = err.into();
            report(&err, cli.quiet);
            err.to_exit_code()
        }
    }
}

fn resolve_config(cli: &Cli, root: &std::path::Path) -> Result<Config, AcpError> {
    let config_path = cli.config.clone().or_else(|| acp_config::discover_config_path(root));
    let file = acp_config::load_config_file(config_path.as_deref())
        .map_err(|e| AcpError::Config(format!("invalid .acp/config.toml: {e}")))?;

    let overrides = CliOverrides {
        model: cli.model.clone(),
        max_retries: cli.max_retries,
        allow_ignore_governance: cli.allow_ignore_governance.then_some(true),
        strict_validation: cli.strict_validation.then_some(true),
    };

    Ok(acp_config::resolve(&overrides, &file))
}

async fn dispatch(cli: &Cli, engine: &Engine) -> Result<(), EngineError> {
    match &cli.command {
        Commands::Init { force } => commands::execute_init(engine, *force).await,
        Commands::Specify { description, force } => {
            commands::execute_specify(engine, description, *force).await
        }
        Commands::Plan { run_id, force } => {
            commands::execute_plan(engine, run_id.as_deref(), *force).await
        }
        Commands::Implement { run_id, force } => {
            commands::execute_implement(engine, run_id.as_deref(), *force).await
        }
        Commands::Resume { run_id, force } => {
            commands::execute_resume(engine, run_id.as_deref(), *force).await
        }
        Commands::Status { run_id } => commands::execute_status(engine, run_id.as_deref()),
        Commands::History => commands::execute_history(engine),
    }
}

fn report(err: &AcpError, quiet: bool) {
    if quiet {
        eprintln!("error: {err}");
        return;
    }

    eprintln!("error: {}", err.user_message());
    if let Some(context) = err.context() {
        eprintln!("  {context}");
    }
    for suggestion in err.suggestions() {
        eprintln!("  -> {suggestion}");
    }
}
