use serde::{Deserialize, Serialize};

/// The kind of artifact a violation (or an artifact-store write) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Spec,
    Research,
    Plan,
    DataModel,
    Contract,
    Quickstart,
    Code,
}

impl ArtifactKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Spec => "spec",
            Self::Research => "research",
            Self::Plan => "plan",
            Self::DataModel => "data_model",
            Self::Contract => "contract",
            Self::Quickstart => "quickstart",
            Self::Code => "code",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a governance violation. Informational only: the engine
/// treats any violation, of any severity, as a routing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A single structured finding from the Governance Validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Identifier of the violated principle (a constitution heading, or a
    /// synthetic id such as `BUILTIN-LEAKAGE` for a built-in rule).
    pub principle: String,
    /// Name of the artifact the violation was found in (e.g. `spec.md`,
    /// or a contract file name).
    pub artifact: String,
    /// 1-indexed line number within the artifact, when known.
    pub line: Option<u32>,
    pub description: String,
    pub suggested_fix: String,
    pub severity: Severity,
}

impl Violation {
    #[must_use]
    pub fn new(
        principle: impl Into<String>,
        artifact: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            principle: principle.into(),
            artifact: artifact.into(),
            line: None,
            description: description.into(),
            suggested_fix: suggested_fix.into(),
            severity,
        }
    }

    #[must_use]
    pub const fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}
