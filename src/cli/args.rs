//! Command-line surface: a small, fixed set of subcommands mirroring the
//! workflow graph's phases plus the read-only `status`/`history` views.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "acp", version, about = "A governed, spec-driven development workflow engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository root to operate in (defaults to the current directory).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Suppress progress announcements; only errors are printed.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Emit verbose tracing output (also honors `RUST_LOG`).
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Override the configured model alias for this invocation.
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Override `MAX_RETRIES` for this invocation.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Offer "Ignore" as a remediation choice on governance failure.
    #[arg(long, global = true)]
    pub allow_ignore_governance: bool,

    /// Treat every governance finding as a hard failure, regardless of
    /// severity.
    #[arg(long, global = true)]
    pub strict_validation: bool,

    /// Path to a config file to use instead of the discovered one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the `.acp/` tree and a starter constitution; append `.acp/`
    /// to `.gitignore`. Idempotent unless `--force` is given.
    Init {
        /// Overwrite an existing starter constitution.
        #[arg(long)]
        force: bool,
    },

    /// Start a new run through the specification phase.
    Specify {
        /// Natural-language feature description.
        description: String,

        /// Run non-interactively: pre-flight questions are not asked and a
        /// governance failure is aborted rather than prompted.
        #[arg(long)]
        force: bool,
    },

    /// Run the planning phase for a run (defaults to the latest paused run).
    Plan {
        run_id: Option<String>,

        #[arg(long)]
        force: bool,
    },

    /// Run the implementation phase for a run (defaults to the latest
    /// paused run).
    Implement {
        run_id: Option<String>,

        #[arg(long)]
        force: bool,
    },

    /// Resume a run from its current phase (defaults to the latest run).
    Resume {
        run_id: Option<String>,

        #[arg(long)]
        force: bool,
    },

    /// Print a run's current phase, phases completed, and next action.
    Status { run_id: Option<String> },

    /// List all runs, most recently updated first.
    History,
}
