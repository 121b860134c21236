//! Top-level error taxonomy with user-friendly reporting and exit-code mapping.
//!
//! `AcpError` is the error type the CLI boundary collapses every crate's
//! typed error into. Library code should prefer its own narrower error type
//! (`StateError`, `CheckpointError`, ...) and only cross into `AcpError` at
//! the command layer.

use thiserror::Error;

/// Top-level error type returned at the CLI boundary.
#[derive(Error, Debug)]
pub enum AcpError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("state invariant violated: {0}")]
    State(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("no such run: '{0}'")]
    RunNotFound(String),

    #[error("artifact store error: {0}")]
    Artifact(String),

    #[error("constitution error: {0}")]
    Constitution(String),

    #[error("governance failed after {retries} attempt(s): {summary}")]
    GovernanceExhausted { retries: u32, summary: String },

    #[error("run aborted by user")]
    Aborted,

    #[error("agent error: {0}")]
    Agent(String),

    #[error("interaction error: {0}")]
    Interaction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Categories of errors for grouping similar failures in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    StateInvariant,
    Persistence,
    Governance,
    Agent,
    Interaction,
    FileSystem,
    UserInput,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::StateInvariant => write!(f, "State Invariant"),
            Self::Persistence => write!(f, "Persistence"),
            Self::Governance => write!(f, "Governance"),
            Self::Agent => write!(f, "Agent"),
            Self::Interaction => write!(f, "Interaction"),
            Self::FileSystem => write!(f, "File System"),
            Self::UserInput => write!(f, "User Input"),
        }
    }
}

/// Implemented by every error type in the workspace that wants to surface a
/// human-facing message, context, and remediation suggestions, in addition
/// to its `Display` impl (which stays terse, for logs).
pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn context(&self) -> Option<String>;
    fn suggestions(&self) -> Vec<String>;
    fn category(&self) -> ErrorCategory;
}

impl AcpError {
    /// Map this error to a process exit code per the engine's exit-code contract:
    /// 0 success, 1 user-level failure, 2 engine/internal error. A
    /// nonexistent run id is a user mistake, not a corrupted checkpoint or
    /// filesystem failure, so `RunNotFound` stays at exit 1 even though it
    /// travels through the same `CheckpointError` type as the exit-2 cases.
    #[must_use]
    pub const fn to_exit_code(&self) -> i32 {
        match self {
            Self::Checkpoint(_) | Self::Io(_) => 2,
            _ => 1,
        }
    }
}

impl UserFriendlyError for AcpError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            Self::State(msg) => format!("Internal state became inconsistent: {msg}"),
            Self::Checkpoint(msg) => format!("Checkpoint could not be read or written: {msg}"),
            Self::RunNotFound(run_id) => format!("No run named '{run_id}' exists"),
            Self::Artifact(msg) => format!("Artifact could not be read or written: {msg}"),
            Self::Constitution(msg) => format!("Constitution could not be loaded: {msg}"),
            Self::GovernanceExhausted { retries, summary } => format!(
                "Governance did not pass after {retries} attempt(s): {summary}"
            ),
            Self::Aborted => "The run was aborted".to_string(),
            Self::Agent(msg) => format!("A phase agent failed: {msg}"),
            Self::Interaction(msg) => format!("Could not collect a required answer: {msg}"),
            Self::Io(err) => format!("Filesystem error: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Constitution(_) => {
                Some("Every generated artifact is validated against .acp/templates/constitution.md".to_string())
            }
            Self::GovernanceExhausted { .. } => {
                Some("MAX_RETRIES was reached without the validator passing".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Constitution(_) => vec!["Run `acp init` to create a starter constitution".to_string()],
            Self::Checkpoint(_) => vec![
                "Run `acp history` to see which runs are still readable".to_string(),
            ],
            Self::RunNotFound(_) => vec![
                "Run `acp history` to see valid run ids".to_string(),
            ],
            Self::GovernanceExhausted { .. } => vec![
                "Edit the constitution and resume with `acp resume`".to_string(),
                "Re-run with an override flag to ignore the violation, if your policy allows it"
                    .to_string(),
            ],
            _ => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::State(_) => ErrorCategory::StateInvariant,
            Self::Checkpoint(_) | Self::Artifact(_) => ErrorCategory::Persistence,
            Self::RunNotFound(_) => ErrorCategory::UserInput,
            Self::Constitution(_) | Self::GovernanceExhausted { .. } => ErrorCategory::Governance,
            Self::Aborted | Self::Agent(_) => ErrorCategory::Agent,
            Self::Interaction(_) => ErrorCategory::Interaction,
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}
