use serde::{Deserialize, Serialize};

/// A phase in the workflow, in the order it must be completed.
///
/// Only forward transitions are legal; re-entry of the *current* phase is
/// legal during retry, but the enum never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    Init,
    Specify,
    Plan,
    Implement,
    Complete,
}

impl PhaseId {
    /// All phases, in their canonical order.
    pub const ORDER: [Self; 5] = [
        Self::Init,
        Self::Specify,
        Self::Plan,
        Self::Implement,
        Self::Complete,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Specify => "specify",
            Self::Plan => "plan",
            Self::Implement => "implement",
            Self::Complete => "complete",
        }
    }

    /// The next phase in the enum, or `None` if this is the terminal phase.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::Specify),
            Self::Specify => Some(Self::Plan),
            Self::Plan => Some(Self::Implement),
            Self::Implement => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Whether this phase is a terminal phase with no further routing.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall status of a Run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    InProgress,
    Paused,
    Completed,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
