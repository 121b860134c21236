//! The typed workflow state and the invariants it must satisfy at every
//! checkpoint boundary.
//!
//! The source design distinguishes a "fast" in-graph representation from a
//! "validating" boundary representation. In a statically typed
//! re-implementation that distinction collapses: `State` is the single
//! record type, and [`validate`] is invoked explicitly at the boundaries
//! that matter (checkpoint save/load, [`transition`]) rather than on every
//! field write inside a node.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::phase::PhaseId;
use crate::violation::Violation;

/// Current schema version for the serialized [`State`].
pub const SCHEMA_VERSION: &str = "1.0.0";

/// A `question -> answer` pair collected from a pre-flight round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clarification {
    pub question: String,
    pub answer: String,
}

/// A single implementation task tracked by the Implementation agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
}

/// Distinguishes a test file from its paired implementation file in the
/// code artifact map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeArtifactKind {
    Test,
    Implementation,
}

/// A single generated code artifact (test or implementation file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeArtifact {
    pub kind: CodeArtifactKind,
    pub content: String,
}

/// Validation status of the implementation phase's code artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    Pass,
    Fail,
}

/// The node name, message, and phase of the most recent failure, kept for
/// post-resume display and for `status`'s "next action" hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub node: String,
    pub message: String,
    pub phase: PhaseId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConstitutionState {
    pub text: String,
    pub governance_passes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SpecificationState {
    pub description: String,
    pub spec: String,
    pub clarifications: Vec<Clarification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlanningState {
    pub plan: String,
    pub data_model: String,
    /// `contract_name -> contract_text`, ordered for stable serialization.
    pub contracts: BTreeMap<String, String>,
    pub quickstart: String,
    pub unknowns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImplementationState {
    pub tasks: Vec<Task>,
    pub completed_tasks: BTreeSet<String>,
    /// `path -> artifact`, ordered for stable serialization.
    pub code: BTreeMap<String, CodeArtifact>,
    pub validation_status: ValidationStatus,
}

impl Default for ValidationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub phase: PhaseId,
    pub error_count: u32,
    pub last_error: Option<LastError>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            phase: PhaseId::Init,
            error_count: 0,
            last_error: None,
        }
    }
}

/// The full payload carried through the workflow graph and persisted at
/// every checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub schema_version: String,
    pub constitution: ConstitutionState,
    pub specification: SpecificationState,
    pub planning: PlanningState,
    pub implementation: ImplementationState,
    pub control: ControlState,
    /// Violations from the most recent governance run, grouped by artifact
    /// name, so they survive a checkpoint and can be displayed post-resume.
    pub violations: BTreeMap<String, Vec<Violation>>,
    /// Maximum error count before a run must transition to `failed`. Carried
    /// in the state so a resumed run enforces the same bound it started
    /// with, even if the ambient config changes between invocations.
    pub max_retries: u32,
}

impl Default for State {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            constitution: ConstitutionState::default(),
            specification: SpecificationState::default(),
            planning: PlanningState::default(),
            implementation: ImplementationState::default(),
            control: ControlState::default(),
            violations: BTreeMap::new(),
            max_retries: crate::MAX_RETRIES,
        }
    }
}

/// A named invariant violation. The variant name identifies which §3
/// invariant failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("invariant 1 violated: spec is non-empty but constitution is empty or governance has not passed")]
    SpecWithoutGovernedConstitution,

    #[error("invariant 2 violated: plan is non-empty but spec is empty")]
    PlanWithoutSpec,

    #[error("invariant 3 violated: implementation state is non-empty but plan or data model is empty")]
    ImplementationWithoutPlanAndDataModel,

    #[error("invariant 4 violated: phase is complete but task '{0}' was never marked completed")]
    IncompleteTaskAtCompletion(String),

    #[error("invariant 5 violated: completed task '{0}' does not appear in the task list")]
    CompletedTaskNotInTaskList(String),

    #[error("invariant 6 violated: error_count ({0}) reached max_retries but status is not failed")]
    ErrorCountExhaustedButNotFailed(u32),

    #[error("invariant 7 violated: unsupported schema version '{0}'")]
    UnsupportedSchemaVersion(String),
}

/// Run every §3 invariant against `state`. An `Ok(())` means the state may
/// be safely checkpointed.
///
/// The `in_progress` check for invariant 6 needs to know whether the
/// caller is about to persist the state as `in_progress`; pass `false` when
/// writing a terminal (`failed`/`completed`) status.
///
/// # Errors
///
/// Returns the first invariant that fails, in invariant order.
pub fn validate(state: &State, about_to_be_in_progress: bool) -> Result<(), StateError> {
    if state.schema_version != SCHEMA_VERSION {
        return Err(StateError::UnsupportedSchemaVersion(
            state.schema_version.clone(),
        ));
    }

    if !state.specification.spec.is_empty()
        && (state.constitution.text.is_empty() || !state.constitution.governance_passes)
    {
        return Err(StateError::SpecWithoutGovernedConstitution);
    }

    if !state.planning.plan.is_empty() && state.specification.spec.is_empty() {
        return Err(StateError::PlanWithoutSpec);
    }

    let implementation_nonempty =
        !state.implementation.tasks.is_empty() || !state.implementation.code.is_empty();
    if implementation_nonempty
        && (state.planning.plan.is_empty() || state.planning.data_model.is_empty())
    {
        return Err(StateError::ImplementationWithoutPlanAndDataModel);
    }

    if state.control.phase == PhaseId::Complete {
        for task in &state.implementation.tasks {
            if !state.implementation.completed_tasks.contains(&task.id) {
                return Err(StateError::IncompleteTaskAtCompletion(task.id.clone()));
            }
        }
    }

    let task_ids: BTreeSet<&str> = state
        .implementation
        .tasks
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    for completed in &state.implementation.completed_tasks {
        if !task_ids.contains(completed.as_str()) {
            return Err(StateError::CompletedTaskNotInTaskList(completed.clone()));
        }
    }

    if about_to_be_in_progress && state.control.error_count >= state.max_retries {
        return Err(StateError::ErrorCountExhaustedButNotFailed(
            state.control.error_count,
        ));
    }

    Ok(())
}

/// The only supported way to advance a phase: clone `state`, apply
/// `updates`, set the new phase, and run full invariant validation.
///
/// # Errors
///
/// Returns the invariant violated by the updated state, if any. `state` is
/// left untouched on error.
pub fn transition(
    state: &State,
    new_phase: PhaseId,
    updates: impl FnOnce(&mut State),
) -> Result<State, StateError> {
    let mut next = state.clone();
    updates(&mut next);
    next.control.phase = new_phase;
    validate(&next, true)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governed_state() -> State {
        let mut state = State::default();
        state.constitution.text = "principles".to_string();
        state.constitution.governance_passes = true;
        state
    }

    #[test]
    fn default_state_is_valid() {
        assert!(validate(&State::default(), true).is_ok());
    }

    #[test]
    fn spec_requires_governed_constitution() {
        let mut state = State::default();
        state.specification.spec = "# Spec".to_string();
        assert_eq!(
            validate(&state, true),
            Err(StateError::SpecWithoutGovernedConstitution)
        );
    }

    #[test]
    fn plan_requires_spec() {
        let mut state = governed_state();
        state.planning.plan = "# Plan".to_string();
        assert_eq!(validate(&state, true), Err(StateError::PlanWithoutSpec));
    }

    #[test]
    fn implementation_requires_plan_and_data_model() {
        let mut state = governed_state();
        state.specification.spec = "# Spec".to_string();
        state.implementation.tasks.push(Task {
            id: "T1".to_string(),
            description: "do it".to_string(),
        });
        assert_eq!(
            validate(&state, true),
            Err(StateError::ImplementationWithoutPlanAndDataModel)
        );
    }

    #[test]
    fn completed_tasks_must_be_subset_of_task_ids() {
        let mut state = governed_state();
        state.specification.spec = "# Spec".to_string();
        state.planning.plan = "# Plan".to_string();
        state.planning.data_model = "# Data".to_string();
        state.implementation.completed_tasks.insert("ghost".to_string());
        assert_eq!(
            validate(&state, true),
            Err(StateError::CompletedTaskNotInTaskList("ghost".to_string()))
        );
    }

    #[test]
    fn complete_phase_requires_all_tasks_completed() {
        let mut state = governed_state();
        state.specification.spec = "# Spec".to_string();
        state.planning.plan = "# Plan".to_string();
        state.planning.data_model = "# Data".to_string();
        state.implementation.tasks.push(Task {
            id: "T1".to_string(),
            description: "do it".to_string(),
        });
        state.control.phase = PhaseId::Complete;
        assert_eq!(
            validate(&state, false),
            Err(StateError::IncompleteTaskAtCompletion("T1".to_string()))
        );

        state.implementation.completed_tasks.insert("T1".to_string());
        assert!(validate(&state, false).is_ok());
    }

    #[test]
    fn exhausted_error_count_rejects_in_progress_write() {
        let mut state = State::default();
        state.control.error_count = state.max_retries;
        assert_eq!(
            validate(&state, true),
            Err(StateError::ErrorCountExhaustedButNotFailed(state.max_retries))
        );
        // A terminal (failed) write is allowed.
        assert!(validate(&state, false).is_ok());
    }

    #[test]
    fn unsupported_schema_version_is_rejected() {
        let mut state = State::default();
        state.schema_version = "0.1.0".to_string();
        assert_eq!(
            validate(&state, true),
            Err(StateError::UnsupportedSchemaVersion("0.1.0".to_string()))
        );
    }

    #[test]
    fn transition_validates_and_leaves_input_untouched_on_failure() {
        let state = State::default();
        let result = transition(&state, PhaseId::Specify, |s| {
            s.specification.spec = "# Spec".to_string();
            // constitution left ungoverned -> invariant 1 should fail
        });
        assert_eq!(result, Err(StateError::SpecWithoutGovernedConstitution));
        assert_eq!(state.control.phase, PhaseId::Init);
    }

    #[test]
    fn transition_succeeds_and_advances_phase() {
        let state = governed_state();
        let next = transition(&state, PhaseId::Specify, |s| {
            s.specification.spec = "# Spec".to_string();
        })
        .unwrap();
        assert_eq!(next.control.phase, PhaseId::Specify);
        assert_eq!(next.specification.spec, "# Spec");
    }

    #[test]
    fn round_trips_through_json() {
        let mut state = governed_state();
        state.specification.spec = "# Spec".to_string();
        state.planning.unknowns.push("pending question".to_string());

        let json = serde_json::to_string(&state).unwrap();
        let restored: State = serde_json::from_str(&json).unwrap();
        assert_eq!(state, restored);
        assert!(validate(&restored, true).is_ok());
    }
}
