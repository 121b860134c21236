use acp_agent::AgentError;
use acp_artifact::ArtifactError;
use acp_checkpoint::CheckpointError;
use acp_constitution::ConstitutionError;
use acp_interaction::InteractionError;
use acp_types::{PhaseId, StateError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("run '{0}' is at phase '{1}', which is not ready for this command")]
    WrongPhase(String, PhaseId),
    #[error("run '{0}' has already completed")]
    AlreadyComplete(String),
    #[error("no runs exist yet; start one with `acp specify`")]
    NoRuns,
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Constitution(#[from] ConstitutionError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("the run was aborted by the user")]
    Aborted,
    #[error("governance did not pass after {retries} attempt(s)")]
    GovernanceExhausted { retries: u32 },
}

impl From<EngineError> for acp_utils::AcpError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::WrongPhase(..) | EngineError::AlreadyComplete(_) | EngineError::NoRuns => {
                Self::State(err.to_string())
            }
            EngineError::Checkpoint(CheckpointError::NotFound(run_id)) => Self::RunNotFound(run_id),
            EngineError::Checkpoint(e) => Self::Checkpoint(e.to_string()),
            EngineError::Constitution(e) => Self::Constitution(e.to_string()),
            EngineError::Agent(e) => Self::Agent(e.to_string()),
            EngineError::Artifact(e) => Self::Artifact(e.to_string()),
            EngineError::Interaction(e) => Self::Interaction(e.to_string()),
            EngineError::State(e) => Self::State(e.to_string()),
            EngineError::Aborted => Self::Aborted,
            EngineError::GovernanceExhausted { retries } => Self::GovernanceExhausted {
                retries,
                summary: "see the run's violations with `acp status`".to_string(),
            },
        }
    }
}
