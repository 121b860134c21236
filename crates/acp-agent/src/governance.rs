//! The Governance agent: a thin adapter over [`acp_governance::validate`]
//! that figures out which artifacts the current phase just produced,
//! validates each, and attaches the result to the State.

use acp_interaction::Announcement;
use acp_types::{ArtifactKind, PhaseId, State};
use async_trait::async_trait;

use crate::context::{Agent, AgentContext, AgentError};

pub struct GovernanceAgent;

impl GovernanceAgent {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for GovernanceAgent {
    fn default() -> Self {
        Self::new()
    }
}

/// The `(kind, artifact name, text)` triples produced by the phase the
/// State currently sits in, in a stable order.
fn artifacts_for_phase(state: &State) -> Vec<(ArtifactKind, String, String)> {
    match state.control.phase {
        PhaseId::Specify => {
            vec![(ArtifactKind::Spec, "spec.md".to_string(), state.specification.spec.clone())]
        }
        PhaseId::Plan => {
            let mut artifacts = vec![
                (ArtifactKind::Plan, "plan.md".to_string(), state.planning.plan.clone()),
                (
                    ArtifactKind::DataModel,
                    "data-model.md".to_string(),
                    state.planning.data_model.clone(),
                ),
                (
                    ArtifactKind::Quickstart,
                    "quickstart.md".to_string(),
                    state.planning.quickstart.clone(),
                ),
            ];
            for (name, text) in &state.planning.contracts {
                artifacts.push((
                    ArtifactKind::Contract,
                    format!("contracts/{name}.yaml"),
                    text.clone(),
                ));
            }
            artifacts
        }
        PhaseId::Implement => state
            .implementation
            .code
            .iter()
            .map(|(path, artifact)| (ArtifactKind::Code, path.clone(), artifact.content.clone()))
            .collect(),
        PhaseId::Init | PhaseId::Complete => Vec::new(),
    }
}

#[async_trait]
impl Agent for GovernanceAgent {
    async fn run(&self, state: State, ctx: &AgentContext<'_>) -> Result<State, AgentError> {
        let mut next = state.clone();

        let mut grouped = std::collections::BTreeMap::new();
        for (kind, name, text) in artifacts_for_phase(&next) {
            let violations = acp_governance::validate(ctx.constitution, kind, &name, &text);
            if !violations.is_empty() {
                grouped.insert(name, violations);
            }
        }

        next.constitution.governance_passes = grouped.is_empty();
        if !grouped.is_empty() {
            let flattened: Vec<_> = grouped.values().flatten().cloned().collect();
            ctx.interaction.report_violations(&flattened);
        }
        next.violations = grouped;

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use acp_artifact::ArtifactStore;
    use acp_constitution::Constitution;
    use acp_interaction::NonInteractivePort;
    use acp_llm::MockBackend;
    use acp_types::{CodeArtifact, CodeArtifactKind};
    use tempfile::TempDir;

    use super::*;

    fn ctx_for<'a>(
        llm: &'a MockBackend,
        interaction: &'a NonInteractivePort,
        artifacts: &'a ArtifactStore,
        constitution: &'a Constitution,
    ) -> AgentContext<'a> {
        AgentContext {
            llm,
            interaction,
            artifacts,
            constitution,
        }
    }

    fn harness() -> (MockBackend, NonInteractivePort, TempDir, Constitution) {
        let llm = MockBackend::fixed(String::new());
        let interaction = NonInteractivePort::new(vec![], None);
        let dir = TempDir::new().unwrap();
        let constitution = Constitution {
            text: "# Constitution\n## Core Principles\n## Quality Standards\n".to_string(),
            headings: vec![],
        };
        (llm, interaction, dir, constitution)
    }

    #[tokio::test]
    async fn clean_spec_passes_governance() {
        let (llm, interaction, dir, constitution) = harness();
        let artifacts = ArtifactStore::new(dir.path(), "001-test");
        artifacts.create_run_dir().unwrap();
        let ctx = ctx_for(&llm, &interaction, &artifacts, &constitution);

        let mut state = State::default();
        state.control.phase = PhaseId::Specify;
        state.specification.spec =
            "# Spec\n## User Scenarios\n...\n## Requirements\n...\n## Success Criteria\n...\n"
                .to_string();

        let result = GovernanceAgent::new().run(state, &ctx).await.unwrap();
        assert!(result.constitution.governance_passes);
        assert!(result.violations.is_empty());
    }

    #[tokio::test]
    async fn leaky_spec_fails_governance_and_reports_violations() {
        let (llm, interaction, dir, constitution) = harness();
        let artifacts = ArtifactStore::new(dir.path(), "001-test");
        artifacts.create_run_dir().unwrap();
        let ctx = ctx_for(&llm, &interaction, &artifacts, &constitution);

        let mut state = State::default();
        state.control.phase = PhaseId::Specify;
        state.specification.spec = "# Spec\nImplemented using PostgreSQL.\n".to_string();

        let result = GovernanceAgent::new().run(state, &ctx).await.unwrap();
        assert!(!result.constitution.governance_passes);
        assert!(result.violations.contains_key("spec.md"));
    }

    #[tokio::test]
    async fn code_phase_validates_every_generated_artifact() {
        let (llm, interaction, dir, constitution) = harness();
        let artifacts = ArtifactStore::new(dir.path(), "001-test");
        artifacts.create_run_dir().unwrap();
        let ctx = ctx_for(&llm, &interaction, &artifacts, &constitution);

        let mut state = State::default();
        state.control.phase = PhaseId::Implement;
        state.implementation.code.insert(
            "code/src/t1.impl".to_string(),
            CodeArtifact {
                kind: CodeArtifactKind::Implementation,
                content: "let api_key = \"sk-abcdefghijklmnopqrstuvwxyz\";".to_string(),
            },
        );

        let result = GovernanceAgent::new().run(state, &ctx).await.unwrap();
        assert!(!result.constitution.governance_passes);
        assert!(result.violations.contains_key("code/src/t1.impl"));
    }
}
