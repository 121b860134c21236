//! The `Agent` trait and the shared collaborators every phase agent is
//! handed: an LLM client, the human Interaction Port, the Artifact Store,
//! and the loaded Constitution.

use acp_artifact::ArtifactStore;
use acp_constitution::Constitution;
use acp_interaction::InteractionPort;
use acp_llm::LlmBackend;
use acp_types::State;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] acp_llm::LlmError),
    #[error("interaction with the user failed: {0}")]
    Interaction(#[from] acp_interaction::InteractionError),
    #[error("artifact store error: {0}")]
    Artifact(#[from] acp_artifact::ArtifactError),
    #[error("resulting state is invalid: {0}")]
    InvalidState(#[from] acp_types::StateError),
    #[error("research left {0} unknown(s) unresolved")]
    UnresolvedUnknowns(usize),
    #[error("generated code artifact '{0}' is not structurally valid")]
    InvalidCodeArtifact(String),
}

/// The collaborators a phase agent needs, borrowed for the duration of one
/// `run` call.
pub struct AgentContext<'a> {
    pub llm: &'a dyn LlmBackend,
    pub interaction: &'a dyn InteractionPort,
    pub artifacts: &'a ArtifactStore,
    pub constitution: &'a Constitution,
}

/// A phase agent: given the current `State`, return the `State` it
/// produces. Agents are pure with respect to the State they return — they
/// may call the LLM, write artifacts, and talk to the Interaction Port, but
/// never mutate anything outside what they're handed.
#[async_trait]
pub trait Agent: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AgentError`] on any collaborator failure or postcondition
    /// violation.
    async fn run(&self, state: State, ctx: &AgentContext<'_>) -> Result<State, AgentError>;
}
