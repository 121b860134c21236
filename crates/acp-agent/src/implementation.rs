//! The Implementation agent: test-first code generation. Derives tasks from
//! the spec's Requirements section if none exist yet, then for each task
//! emits a RED test artifact before a GREEN implementation artifact.

use acp_artifact::CodeArtifactKind as StoreCodeKind;
use acp_interaction::Announcement;
use acp_llm::{Message, Prompt};
use acp_types::{CodeArtifact, CodeArtifactKind, State, Task, ValidationStatus};
use async_trait::async_trait;

use crate::context::{Agent, AgentContext, AgentError};
use crate::markdown::bulleted_section;

const TEST_SYSTEM_PROMPT: &str = "You are the implementation phase of a spec-driven development \
workflow, writing the RED half of a test-first cycle. Write a test that exercises the described \
requirement's observable behavior. Do not write the implementation.";

const IMPL_SYSTEM_PROMPT: &str = "You are the implementation phase of a spec-driven development \
workflow, writing the GREEN half of a test-first cycle. Write the implementation that satisfies \
the paired test for the described requirement.";

pub struct ImplementationAgent;

impl ImplementationAgent {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImplementationAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_tasks(spec: &str) -> Vec<Task> {
    bulleted_section(spec, "requirements")
        .into_iter()
        .enumerate()
        .map(|(idx, description)| Task {
            id: format!("T{}", idx + 1),
            description,
        })
        .collect()
}

fn test_artifact_name(task: &Task) -> String {
    format!("{}.test", task.id.to_lowercase())
}

fn impl_artifact_name(task: &Task) -> String {
    format!("{}.impl", task.id.to_lowercase())
}

/// Whether the LLM-returned test body is non-trivial and actually engages
/// with the requirement it was asked to exercise, rather than generic
/// boilerplate: non-empty, and sharing at least one significant word
/// (4+ characters, to skip articles/pronouns) with the requirement's own
/// description.
fn is_valid_test(body: &str, task: &Task) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return false;
    }
    let body_lower = trimmed.to_lowercase();
    task.description
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.len() >= 4)
        .any(|word| body_lower.contains(&word.to_lowercase()))
}

#[async_trait]
impl Agent for ImplementationAgent {
    async fn run(&self, state: State, ctx: &AgentContext<'_>) -> Result<State, AgentError> {
        ctx.interaction.announce(&Announcement::PhaseStarted {
            phase: "implement".to_string(),
        });

        let mut next = state.clone();

        if next.implementation.tasks.is_empty() {
            next.implementation.tasks = derive_tasks(&next.specification.spec);
        }

        for task in next.implementation.tasks.clone() {
            if next.implementation.completed_tasks.contains(&task.id) {
                continue;
            }

            let test_prompt = Prompt::new(vec![
                Message::system(TEST_SYSTEM_PROMPT),
                Message::user(format!("Requirement {}: {}", task.id, task.description)),
            ]);
            let test_body = ctx.llm.complete(&test_prompt).await?.text;
            if !is_valid_test(&test_body, &task) {
                return Err(AgentError::InvalidCodeArtifact(test_artifact_name(&task)));
            }
            let test_content = format!(
                "Requirement: {}\n\n{}\n",
                task.description,
                test_body.trim()
            );
            let test_name = test_artifact_name(&task);
            ctx.artifacts.write_code_artifact(StoreCodeKind::Test, &test_name, &test_content)?;
            next.implementation.code.insert(
                format!("code/tests/{test_name}"),
                CodeArtifact {
                    kind: CodeArtifactKind::Test,
                    content: test_content,
                },
            );

            let impl_prompt = Prompt::new(vec![
                Message::system(IMPL_SYSTEM_PROMPT),
                Message::user(format!("Requirement {}: {}", task.id, task.description)),
            ]);
            let impl_body = ctx.llm.complete(&impl_prompt).await?.text;
            let impl_name = impl_artifact_name(&task);
            ctx.artifacts.write_code_artifact(StoreCodeKind::Implementation, &impl_name, &impl_body)?;
            next.implementation.code.insert(
                format!("code/src/{impl_name}"),
                CodeArtifact {
                    kind: CodeArtifactKind::Implementation,
                    content: impl_body,
                },
            );

            next.implementation.completed_tasks.insert(task.id);
        }

        next.implementation.validation_status = if next
            .implementation
            .tasks
            .iter()
            .all(|task| next.implementation.completed_tasks.contains(&task.id))
        {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        };

        ctx.interaction.announce(&Announcement::PhaseCompleted {
            phase: "implement".to_string(),
        });
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use acp_artifact::ArtifactStore;
    use acp_constitution::Constitution;
    use acp_interaction::NonInteractivePort;
    use acp_llm::MockBackend;
    use tempfile::TempDir;

    use super::*;

    fn spec_with_requirements() -> String {
        "# Spec\n## Requirements\n- Users can log in with a password\n- Users can reset a password\n"
            .to_string()
    }

    async fn run_agent(state: State, llm: &MockBackend, dir: &TempDir) -> State {
        let artifacts = ArtifactStore::new(dir.path(), "001-test");
        artifacts.create_run_dir().unwrap();
        let interaction = NonInteractivePort::new(vec![], None);
        let constitution = Constitution {
            text: "# Constitution".to_string(),
            headings: vec![],
        };
        let ctx = AgentContext {
            llm,
            interaction: &interaction,
            artifacts: &artifacts,
            constitution: &constitution,
        };
        ImplementationAgent::new().run(state, &ctx).await.unwrap()
    }

    #[tokio::test]
    async fn derives_tasks_from_requirements_and_completes_them() {
        let mut state = State::default();
        state.specification.spec = spec_with_requirements();
        state.planning.plan = "# Plan".to_string();
        state.planning.data_model = "# Data".to_string();
        let llm = MockBackend::fixed(
            "Assert that the password flow behaves as described.".to_string(),
        );
        let dir = TempDir::new().unwrap();

        let result = run_agent(state, &llm, &dir).await;

        assert_eq!(result.implementation.tasks.len(), 2);
        assert_eq!(result.implementation.completed_tasks.len(), 2);
        assert_eq!(result.implementation.code.len(), 4);
        assert_eq!(result.implementation.validation_status, ValidationStatus::Pass);
    }

    #[tokio::test]
    async fn a_test_body_unrelated_to_the_requirement_is_rejected() {
        let mut state = State::default();
        state.specification.spec = spec_with_requirements();
        state.planning.plan = "# Plan".to_string();
        state.planning.data_model = "# Data".to_string();
        // Shares no significant word with either requirement description.
        let llm = MockBackend::fixed("The sky is blue today.".to_string());
        let dir = TempDir::new().unwrap();

        let artifacts = ArtifactStore::new(dir.path(), "001-test");
        artifacts.create_run_dir().unwrap();
        let interaction = NonInteractivePort::new(vec![], None);
        let constitution = Constitution {
            text: "# Constitution".to_string(),
            headings: vec![],
        };
        let ctx = AgentContext {
            llm: &llm,
            interaction: &interaction,
            artifacts: &artifacts,
            constitution: &constitution,
        };

        let result = ImplementationAgent::new().run(state, &ctx).await;
        assert!(matches!(result, Err(AgentError::InvalidCodeArtifact(name)) if name == "t1.test"));
    }

    #[tokio::test]
    async fn already_completed_tasks_are_not_regenerated() {
        let mut state = State::default();
        state.specification.spec = spec_with_requirements();
        state.planning.plan = "# Plan".to_string();
        state.planning.data_model = "# Data".to_string();
        state.implementation.tasks = derive_tasks(&state.specification.spec);
        state.implementation.completed_tasks.insert("T1".to_string());
        state.implementation.completed_tasks.insert("T2".to_string());

        // An empty queue: any LLM call here means a completed task was
        // regenerated.
        let llm = MockBackend::new(vec![]);
        let dir = TempDir::new().unwrap();

        let result = run_agent(state, &llm, &dir).await;
        assert!(result.implementation.code.is_empty());
        assert_eq!(result.implementation.validation_status, ValidationStatus::Pass);
    }
}
