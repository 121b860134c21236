//! The Architect agent: Phase 0 discharges every open unknown into
//! `research.md`; Phase 1 produces `plan.md`, `data-model.md`, optional
//! `contracts/*.yaml`, and `quickstart.md`.

use acp_interaction::Announcement;
use acp_llm::{Message, Prompt};
use acp_types::State;
use async_trait::async_trait;

use crate::context::{Agent, AgentContext, AgentError};
use crate::markdown::{bulleted_section, explicit_marker};

const RESEARCH_SYSTEM_PROMPT: &str = "You are the research phase of a spec-driven development \
workflow. For every open question listed, write a '## <question>' heading followed by its \
resolution. Every question must be discharged; do not leave any unanswered.";

const PLAN_SYSTEM_PROMPT: &str = "You are the planning phase of a spec-driven development \
workflow. Write a plan.md with 'Overview' and 'Architecture' headings describing how the \
feature will be built, in terms of behavior and structure — never naming a concrete \
programming language, framework, database, or cloud provider.";

const QUICKSTART_SYSTEM_PROMPT: &str = "You are the planning phase of a spec-driven development \
workflow. Write a quickstart.md walking a user through exercising the feature, including at \
least one fenced code block showing the commands or calls involved.";

const CONTRACT_SYSTEM_PROMPT: &str = "You are the planning phase of a spec-driven development \
workflow. Write a single YAML document describing the feature's primary interface contract. \
The document must be a mapping with a top-level 'name' key.";

const DATA_HEURISTIC_KEYWORDS: &[&str] = &[
    "database", "persist", "record", "schema", "entity", "table", "store data", "repository",
];
const INTERFACE_HEURISTIC_KEYWORDS: &[&str] =
    &["endpoint", "api", "interface", "request", "response", "contract"];

pub struct ArchitectAgent;

impl ArchitectAgent {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ArchitectAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_unknowns(spec: &str) -> Vec<String> {
    bulleted_section(spec, "open questions")
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}

fn needs_data_model(spec: &str) -> bool {
    explicit_marker(spec, "Data Model").unwrap_or_else(|| contains_any(spec, DATA_HEURISTIC_KEYWORDS))
}

fn needs_contracts(spec: &str) -> bool {
    explicit_marker(spec, "Interfaces").unwrap_or_else(|| contains_any(spec, INTERFACE_HEURISTIC_KEYWORDS))
}

fn unresolved_count(unknowns: &[String], research: &str) -> usize {
    let lower = research.to_lowercase();
    unknowns
        .iter()
        .filter(|unknown| !lower.contains(&unknown.to_lowercase()))
        .count()
}

#[async_trait]
impl Agent for ArchitectAgent {
    async fn run(&self, state: State, ctx: &AgentContext<'_>) -> Result<State, AgentError> {
        ctx.interaction.announce(&Announcement::PhaseStarted {
            phase: "plan".to_string(),
        });

        let mut next = state.clone();

        if next.planning.unknowns.is_empty() {
            next.planning.unknowns = extract_unknowns(&next.specification.spec);
        }

        let research = if next.planning.unknowns.is_empty() {
            "No open unknowns were identified during specification.\n".to_string()
        } else {
            let prompt = Prompt::new(vec![
                Message::system(RESEARCH_SYSTEM_PROMPT),
                Message::user(format!("Open questions:\n{}", next.planning.unknowns.join("\n"))),
            ]);
            ctx.llm.complete(&prompt).await?.text
        };

        let unresolved = unresolved_count(&next.planning.unknowns, &research);
        if unresolved > 0 {
            return Err(AgentError::UnresolvedUnknowns(unresolved));
        }
        ctx.artifacts.write_text("research.md", &research)?;
        next.planning.unknowns.clear();

        let plan_prompt = Prompt::new(vec![
            Message::system(PLAN_SYSTEM_PROMPT),
            Message::user(next.specification.spec.clone()),
        ]);
        let plan = ctx.llm.complete(&plan_prompt).await?.text;
        ctx.artifacts.write_text("plan.md", &plan)?;
        next.planning.plan = plan.clone();

        let data_model = if needs_data_model(&next.specification.spec) {
            let prompt = Prompt::new(vec![
                Message::system(
                    "Write a data-model.md describing the entities this feature persists, \
                     each under its own '## ' heading.",
                ),
                Message::user(plan.clone()),
            ]);
            ctx.llm.complete(&prompt).await?.text
        } else {
            "## Not Applicable\nThis feature persists no data of its own.\n".to_string()
        };
        ctx.artifacts.write_text("data-model.md", &data_model)?;
        next.planning.data_model = data_model;

        if needs_contracts(&next.specification.spec) {
            let prompt = Prompt::new(vec![
                Message::system(CONTRACT_SYSTEM_PROMPT),
                Message::user(plan.clone()),
            ]);
            let contract = ctx.llm.complete(&prompt).await?.text;
            ctx.artifacts.write_contract("primary", &contract)?;
            next.planning.contracts.insert("primary".to_string(), contract);
        }

        let quickstart_prompt = Prompt::new(vec![
            Message::system(QUICKSTART_SYSTEM_PROMPT),
            Message::user(plan),
        ]);
        let quickstart = ctx.llm.complete(&quickstart_prompt).await?.text;
        ctx.artifacts.write_text("quickstart.md", &quickstart)?;
        next.planning.quickstart = quickstart;

        ctx.interaction.announce(&Announcement::PhaseCompleted {
            phase: "plan".to_string(),
        });
        Ok(next)
    }
}
