//! Typed workflow state, the phase enum, and the invariants that must hold
//! at every checkpoint boundary.

mod phase;
mod state;
mod violation;

pub use phase::{PhaseId, RunStatus};
pub use state::{
    Clarification, CodeArtifact, CodeArtifactKind, ConstitutionState, ControlState,
    ImplementationState, LastError, PlanningState, SpecificationState, State, StateError, Task,
    ValidationStatus, SCHEMA_VERSION, transition, validate,
};
pub use violation::{ArtifactKind, Severity, Violation};

/// Bound on the error counter before a Run is marked `failed`.
pub const MAX_RETRIES: u32 = 3;

/// Upper bound on pre-flight questions asked in a single run.
pub const MAX_PREFLIGHT_QUESTIONS: usize = 10;
