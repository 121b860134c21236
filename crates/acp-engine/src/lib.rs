//! The workflow engine: a small, fixed directed graph over the phase
//! agents, explicit `match`-based routing (never a generic graph library —
//! there are at most seven nodes and routing is a pure function of the
//! governance verdict and the retry counter), retry policy, checkpoint
//! hooks, and resume logic.

mod error;
mod node;

pub use error::EngineError;
pub use node::PhaseNode;

use std::path::PathBuf;

use acp_agent::{Agent, AgentContext, GovernanceAgent};
use acp_artifact::ArtifactStore;
use acp_checkpoint::{CheckpointStore, RunMetadata};
use acp_config::Config;
use acp_interaction::{Announcement, InteractionPort, Remediation};
use acp_llm::LlmBackend;
use acp_types::{LastError, PhaseId, RunStatus, State};
use acp_utils::slug::{format_run_id, slugify};

/// A read-only view of a run's status, for the `status` and `history`
/// commands.
#[derive(Debug, Clone)]
pub struct RunStatusView {
    pub metadata: RunMetadata,
    pub state: State,
}

pub struct Engine {
    root: PathBuf,
    checkpoints: CheckpointStore,
    config: Config,
}

const STARTER_CONSTITUTION: &str = "# Constitution\n\n\
## Core Principles\n\
- Specs describe observable behavior, never implementation choices.\n\
- Every artifact must be independently reviewable without reading the code.\n\n\
## Quality Standards\n\
- Tests are written before the implementation they exercise.\n\
- No secret values ever appear in a generated artifact.\n";

impl Engine {
    #[must_use]
    pub fn new(root: PathBuf, config: Config) -> Self {
        let checkpoints = CheckpointStore::new(&root);
        Self { root, checkpoints, config }
    }

    /// Create the `.acp/` tree and a starter constitution, and append
    /// `.acp/` to `.gitignore` if it is not already ignored. Idempotent: a
    /// pre-existing tree is left untouched unless `force` is set, in which
    /// case only the starter constitution is overwritten (never
    /// `.acp/state/`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Artifact`]-style I/O failures are instead
    /// surfaced as [`EngineError::Checkpoint`] wrapping the underlying I/O
    /// error, since no checkpoint-specific operation is involved here; see
    /// the `Io` variant on the inner error types for detail.
    pub fn init(&self, force: bool) -> Result<(), EngineError> {
        let constitution_path = self.root.join(".acp").join("templates").join("constitution.md");
        if force || !constitution_path.exists() {
            acp_utils::atomic_write::write_file_atomic(&constitution_path, STARTER_CONSTITUTION)
                .map_err(acp_checkpoint::CheckpointError::Io)?;
        }

        let gitignore_path = self.root.join(".gitignore");
        let existing = std::fs::read_to_string(&gitignore_path).unwrap_or_default();
        if !existing.lines().any(|line| line.trim() == ".acp/") {
            let mut updated = existing;
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(".acp/\n");
            acp_utils::atomic_write::write_file_atomic(&gitignore_path, &updated)
                .map_err(acp_checkpoint::CheckpointError::Io)?;
        }

        Ok(())
    }

    /// Create a new run: allocate a run id, write the initial checkpoint
    /// (`pending`), and create the artifact directory. Does not execute any
    /// phase; call [`Engine::specify`] next.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Checkpoint`] if the initial checkpoint cannot
    /// be written.
    pub fn start_run(&self, description: &str) -> Result<RunMetadata, EngineError> {
        let specs_root = self.root.join("specs");
        let ordinal = self
            .checkpoints
            .highest_ordinal()
            .max(ArtifactStore::highest_ordinal(&specs_root))
            + 1;
        let slug = slugify(description);
        let run_id = format_run_id(ordinal, &slug);

        let artifacts = ArtifactStore::new(&self.root, &run_id);
        artifacts.create_run_dir()?;

        let metadata = RunMetadata::new(
            run_id.clone(),
            slug,
            run_id.clone(),
            format!("specs/{run_id}"),
        );

        let mut state = State::default();
        state.max_retries = self.config.max_retries;
        state.specification.description = description.to_string();

        self.checkpoints.save(state, metadata.clone())?;
        Ok(metadata)
    }

    /// Run the `specify` node. The run must be at phase `init`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::WrongPhase`] if the run is not at `init`, or
    /// any error surfaced by the node's agents or the checkpoint store.
    pub async fn specify(
        &self,
        run_id: &str,
        llm: &dyn LlmBackend,
        interaction: &dyn InteractionPort,
    ) -> Result<RunMetadata, EngineError> {
        self.run_named(PhaseNode::Specify, run_id, llm, interaction).await
    }

    /// Run the `plan` node. The run must be at phase `specify`.
    ///
    /// # Errors
    ///
    /// See [`Engine::specify`].
    pub async fn plan(
        &self,
        run_id: &str,
        llm: &dyn LlmBackend,
        interaction: &dyn InteractionPort,
    ) -> Result<RunMetadata, EngineError> {
        self.run_named(PhaseNode::Plan, run_id, llm, interaction).await
    }

    /// Run the `implement` node. The run must be at phase `plan`.
    ///
    /// # Errors
    ///
    /// See [`Engine::specify`].
    pub async fn implement(
        &self,
        run_id: &str,
        llm: &dyn LlmBackend,
        interaction: &dyn InteractionPort,
    ) -> Result<RunMetadata, EngineError> {
        self.run_named(PhaseNode::Implement, run_id, llm, interaction).await
    }

    /// Resume whichever run is named, or the most recently updated run if
    /// none is named, continuing from its current phase. Announces the
    /// phases already completed before continuing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRuns`] if no run exists and none was named,
    /// [`EngineError::AlreadyComplete`] if the resolved run already reached
    /// `complete`, or any error surfaced while running the node.
    pub async fn resume(
        &self,
        run_id: Option<&str>,
        llm: &dyn LlmBackend,
        interaction: &dyn InteractionPort,
    ) -> Result<RunMetadata, EngineError> {
        let run_id = match run_id {
            Some(id) => id.to_string(),
            None => self.checkpoints.latest().ok_or(EngineError::NoRuns)?,
        };

        let (state, metadata, _migrated) = self.checkpoints.load(&run_id)?;
        interaction.announce(&Announcement::SkippingCompletedPhases {
            phases: metadata.phases_completed.iter().map(PhaseId::to_string).collect(),
        });

        let Some(node) = PhaseNode::for_current_phase(state.control.phase) else {
            return Err(EngineError::AlreadyComplete(run_id));
        };

        let mut state = state;
        let mut metadata = metadata;
        self.run_node(node, &mut state, &mut metadata, llm, interaction).await?;
        Ok(metadata)
    }

    /// The current status of a single run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Checkpoint`] if the run cannot be read.
    pub fn status(&self, run_id: &str) -> Result<RunStatusView, EngineError> {
        let (state, metadata, _migrated) = self.checkpoints.load(run_id)?;
        Ok(RunStatusView { metadata, state })
    }

    /// All runs, most recently updated first.
    #[must_use]
    pub fn history(&self) -> Vec<RunMetadata> {
        self.checkpoints.list()
    }

    async fn run_named(
        &self,
        node: PhaseNode,
        run_id: &str,
        llm: &dyn LlmBackend,
        interaction: &dyn InteractionPort,
    ) -> Result<RunMetadata, EngineError> {
        let (mut state, mut metadata, _migrated) = self.checkpoints.load(run_id)?;
        if state.control.phase != node.expected_entry_phase() {
            return Err(EngineError::WrongPhase(run_id.to_string(), state.control.phase));
        }
        self.run_node(node, &mut state, &mut metadata, llm, interaction).await?;
        Ok(metadata)
    }

    /// Drive a single node to completion: agent -> governance -> route,
    /// looping on "regenerate"/"edit constitution" remediation until the
    /// node's governance passes, the retry budget is exhausted, or the
    /// user aborts.
    async fn run_node(
        &self,
        node: PhaseNode,
        state: &mut State,
        metadata: &mut RunMetadata,
        llm: &dyn LlmBackend,
        interaction: &dyn InteractionPort,
    ) -> Result<(), EngineError> {
        metadata.status = RunStatus::InProgress;
        let artifacts = ArtifactStore::new(&self.root, &metadata.run_id);
        let mut constitution = acp_constitution::load(&self.root)?;
        let agent = node.agent();

        let mut working = state.clone();
        let mut regenerate = true;

        loop {
            if regenerate {
                let ctx = AgentContext {
                    llm,
                    interaction,
                    artifacts: &artifacts,
                    constitution: &constitution,
                };
                working = agent.run(working, &ctx).await?;
            }

            // The Governance agent keys its required-section schema off
            // `control.phase`; check against the phase this node's
            // artifacts belong to, not the run's current (pre-transition)
            // phase.
            let mut check_state = working.clone();
            check_state.control.phase = node.target_phase();
            let ctx = AgentContext {
                llm,
                interaction,
                artifacts: &artifacts,
                constitution: &constitution,
            };
            let governed = GovernanceAgent::new().run(check_state, &ctx).await?;
            working.violations = governed.violations;
            working.constitution.governance_passes = governed.constitution.governance_passes;

            if working.constitution.governance_passes {
                *state = acp_types::transition(&working, node.target_phase(), |s| {
                    s.control.error_count = 0;
                    s.control.last_error = None;
                })?;
                metadata.phases_completed.push(node.completed_phase());
                metadata.status = if state.control.phase == PhaseId::Complete {
                    RunStatus::Completed
                } else {
                    RunStatus::Paused
                };
                self.checkpoints.save(state.clone(), metadata.clone())?;
                return Ok(());
            }

            if working.control.error_count >= working.max_retries {
                working.control.last_error = Some(LastError {
                    node: node.label().to_string(),
                    message: "governance violations remained after the retry budget was exhausted"
                        .to_string(),
                    phase: working.control.phase,
                });
                *state = working;
                metadata.status = RunStatus::Failed;
                self.checkpoints.save(state.clone(), metadata.clone())?;
                return Err(EngineError::GovernanceExhausted {
                    retries: state.control.error_count,
                });
            }

            let violations: Vec<_> = working.violations.values().flatten().cloned().collect();
            let remediation = interaction
                .remediate(&violations, self.config.allow_ignore_governance)
                .await?;

            match remediation {
                Remediation::Regenerate => {
                    working.control.error_count += 1;
                    interaction.announce(&Announcement::Retrying {
                        phase: node.label().to_string(),
                        attempt: working.control.error_count,
                        max: working.max_retries,
                    });
                    regenerate = true;
                }
                Remediation::EditConstitution => {
                    constitution = acp_constitution::load(&self.root)?;
                    regenerate = false;
                }
                Remediation::Abort => {
                    *state = working;
                    metadata.status = RunStatus::Failed;
                    self.checkpoints.save(state.clone(), metadata.clone())?;
                    return Err(EngineError::Aborted);
                }
                Remediation::Ignore if self.config.allow_ignore_governance => {
                    working.constitution.governance_passes = true;
                    *state = acp_types::transition(&working, node.target_phase(), |s| {
                        s.control.error_count = 0;
                        s.control.last_error = None;
                    })?;
                    metadata.phases_completed.push(node.completed_phase());
                    metadata.status = if state.control.phase == PhaseId::Complete {
                        RunStatus::Completed
                    } else {
                        RunStatus::Paused
                    };
                    self.checkpoints.save(state.clone(), metadata.clone())?;
                    return Ok(());
                }
                // Ignoring governance requires the explicit override flag;
                // without it, an "ignore" choice (e.g. from a
                // non-interactive port preconfigured with one) is treated
                // as an abort rather than silently bypassing governance.
                Remediation::Ignore => {
                    *state = working;
                    metadata.status = RunStatus::Failed;
                    self.checkpoints.save(state.clone(), metadata.clone())?;
                    return Err(EngineError::Aborted);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use acp_interaction::NonInteractivePort;
    use acp_llm::MockBackend;
    use tempfile::TempDir;

    use super::*;

    fn init_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        let templates = dir.path().join(".acp").join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(
            templates.join("constitution.md"),
            "# Constitution\n## Core Principles\nBe honest.\n## Quality Standards\nTest everything.\n",
        )
        .unwrap();
        dir
    }

    fn spec_responses() -> Vec<String> {
        vec![
            "What is in scope?".to_string(),
            "# Spec\n## User Scenarios\n...\n## Requirements\n- Users can log in\n## Success Criteria\n...\n"
                .to_string(),
        ]
    }

    #[test]
    fn init_is_idempotent_and_appends_gitignore() {
        let dir = TempDir::new().unwrap();
        let engine = Engine::new(dir.path().to_path_buf(), Config::default());

        engine.init(false).unwrap();
        let constitution_path = dir.path().join(".acp").join("templates").join("constitution.md");
        assert!(constitution_path.exists());
        let first = std::fs::read_to_string(&constitution_path).unwrap();

        std::fs::write(&constitution_path, "edited by hand").unwrap();
        engine.init(false).unwrap();
        assert_eq!(std::fs::read_to_string(&constitution_path).unwrap(), "edited by hand");

        engine.init(true).unwrap();
        assert_eq!(std::fs::read_to_string(&constitution_path).unwrap(), first);

        let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(gitignore.lines().any(|line| line == ".acp/"));
    }

    #[tokio::test]
    async fn start_run_allocates_ordinal_one_for_a_fresh_repo() {
        let dir = init_root();
        let engine = Engine::new(dir.path().to_path_buf(), Config::default());
        let metadata = engine.start_run("Add login").unwrap();
        assert!(metadata.run_id.starts_with("001-"));
        assert_eq!(metadata.status, RunStatus::Pending);
    }

    #[tokio::test]
    async fn specify_advances_phase_on_clean_governance_pass() {
        let dir = init_root();
        let engine = Engine::new(dir.path().to_path_buf(), Config::default());
        let metadata = engine.start_run("Add login").unwrap();

        let llm = MockBackend::new(spec_responses());
        let interaction = NonInteractivePort::new(
            vec!["OAuth only".to_string()],
            None,
        );

        let result = engine.specify(&metadata.run_id, &llm, &interaction).await.unwrap();
        assert_eq!(result.phase, PhaseId::Specify);
        assert_eq!(result.status, RunStatus::Paused);

        let status = engine.status(&metadata.run_id).unwrap();
        assert!(status.state.constitution.governance_passes);
    }

    #[tokio::test]
    async fn wrong_phase_is_rejected() {
        let dir = init_root();
        let engine = Engine::new(dir.path().to_path_buf(), Config::default());
        let metadata = engine.start_run("Add login").unwrap();

        let llm = MockBackend::fixed(String::new());
        let interaction = NonInteractivePort::new(vec![], None);

        let result = engine.plan(&metadata.run_id, &llm, &interaction).await;
        assert!(matches!(result, Err(EngineError::WrongPhase(_, PhaseId::Init))));
    }

    #[tokio::test]
    async fn governance_failure_aborts_when_the_user_chooses_to() {
        let dir = init_root();
        let mut config = Config::default();
        config.max_retries = 3;
        let engine = Engine::new(dir.path().to_path_buf(), config);
        let metadata = engine.start_run("Add login").unwrap();

        // The synthesized spec leaks an implementation detail, so governance
        // always fails; the non-interactive port defaults to Abort.
        let llm = MockBackend::new(vec![
            "What is in scope?".to_string(),
            "# Spec\nImplemented in PostgreSQL.\n".to_string(),
        ]);
        let interaction = NonInteractivePort::new(vec!["OAuth only".to_string()], None);

        let result = engine.specify(&metadata.run_id, &llm, &interaction).await;
        assert!(matches!(result, Err(EngineError::Aborted)));

        let status = engine.status(&metadata.run_id).unwrap();
        assert_eq!(status.metadata.status, RunStatus::Failed);
    }

    #[tokio::test]
    async fn governance_failure_exhausts_retries_when_user_keeps_regenerating() {
        let dir = init_root();
        let mut config = Config::default();
        config.max_retries = 2;
        let engine = Engine::new(dir.path().to_path_buf(), config);
        let metadata = engine.start_run("Add login").unwrap();

        let llm = MockBackend::fixed("# Spec\nImplemented in PostgreSQL.\n".to_string());
        let interaction = NonInteractivePort::new(vec![], Some(Remediation::Regenerate));

        let result = engine.specify(&metadata.run_id, &llm, &interaction).await;
        assert!(matches!(result, Err(EngineError::GovernanceExhausted { retries: 2 })));
    }

    #[tokio::test]
    async fn resume_continues_from_the_latest_run_current_phase() {
        let dir = init_root();
        let engine = Engine::new(dir.path().to_path_buf(), Config::default());
        let metadata = engine.start_run("Add login").unwrap();

        let llm = MockBackend::new(spec_responses());
        let interaction = NonInteractivePort::new(vec!["OAuth only".to_string()], None);
        engine.specify(&metadata.run_id, &llm, &interaction).await.unwrap();

        // The spec carries no open questions and no persistence/interface
        // language, so only the plan and quickstart calls actually fire.
        let plan_llm = MockBackend::new(vec![
            "# Plan\n## Overview\n## Architecture\n".to_string(),
            "# Quickstart\n```\nacp specify \"...\"\n```\n".to_string(),
        ]);
        let plan_interaction = NonInteractivePort::new(vec![], None);
        let resumed = engine.resume(None, &plan_llm, &plan_interaction).await.unwrap();
        assert_eq!(resumed.phase, PhaseId::Plan);
    }
}
