//! The Specification agent: turns a raw feature description into a governed
//! `spec.md`, asking at most [`acp_types::MAX_PREFLIGHT_QUESTIONS`]
//! clarifying questions along the way.

use acp_interaction::{Announcement, PreflightQuestion};
use acp_llm::{Message, Prompt};
use acp_types::{Clarification, MAX_PREFLIGHT_QUESTIONS, State};
use async_trait::async_trait;

use crate::context::{Agent, AgentContext, AgentError};

const PREFLIGHT_SYSTEM_PROMPT: &str = "You are the specification phase of a spec-driven \
development workflow. Given a feature description, list the clarifying questions a careful \
analyst would ask before writing a specification. Ask only what the description leaves \
ambiguous. Reply with one question per line, no numbering, no commentary.";

const SPEC_SYSTEM_PROMPT: &str = "You are the specification phase of a spec-driven development \
workflow. Write a spec.md for the described feature. The document must contain the headings \
'User Scenarios', 'Requirements', and 'Success Criteria'. Incorporate every clarifying answer \
supplied. Never mention a programming language, framework, database, or cloud provider — this \
document describes behavior, not implementation.";

pub struct SpecificationAgent;

impl SpecificationAgent {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn parse_questions(raw: &str) -> Vec<String> {
        raw.lines()
            .map(str::trim)
            .map(strip_enumeration)
            .filter(|line| !line.is_empty())
            .take(MAX_PREFLIGHT_QUESTIONS)
            .map(str::to_string)
            .collect()
    }
}

impl Default for SpecificationAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_enumeration(line: &str) -> &str {
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();
    match line.split_once('.') {
        Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit()) && !prefix.is_empty() => {
            rest.trim_start()
        }
        _ => line,
    }
}

fn clarifications_prompt(description: &str, clarifications: &[Clarification]) -> Prompt {
    let mut transcript = String::new();
    for clarification in clarifications {
        transcript.push_str("Q: ");
        transcript.push_str(&clarification.question);
        transcript.push_str("\nA: ");
        transcript.push_str(&clarification.answer);
        transcript.push('\n');
    }
    Prompt::new(vec![
        Message::system(SPEC_SYSTEM_PROMPT),
        Message::user(format!(
            "Feature description:\n{description}\n\nClarifications:\n{transcript}"
        )),
    ])
}

#[async_trait]
impl Agent for SpecificationAgent {
    async fn run(&self, state: State, ctx: &AgentContext<'_>) -> Result<State, AgentError> {
        ctx.interaction.announce(&Announcement::PhaseStarted {
            phase: "specify".to_string(),
        });

        let mut next = state.clone();

        if next.specification.clarifications.is_empty() {
            let prompt = Prompt::new(vec![
                Message::system(PREFLIGHT_SYSTEM_PROMPT),
                Message::user(next.specification.description.clone()),
            ]);
            let completion = ctx.llm.complete(&prompt).await?;
            let questions = Self::parse_questions(&completion.text);

            if !questions.is_empty() {
                let preflight: Vec<PreflightQuestion> = questions
                    .iter()
                    .enumerate()
                    .map(|(idx, question)| PreflightQuestion {
                        ordinal: idx + 1,
                        question: question.clone(),
                        context: None,
                    })
                    .collect();
                let answers = ctx.interaction.ask(&preflight).await?;
                next.specification.clarifications = questions
                    .into_iter()
                    .zip(answers)
                    .map(|(question, answer)| Clarification { question, answer })
                    .collect();
            }
        }

        let prompt = clarifications_prompt(
            &next.specification.description,
            &next.specification.clarifications,
        );
        let completion = ctx.llm.complete(&prompt).await?;
        ctx.artifacts.write_text("spec.md", &completion.text)?;
        next.specification.spec = completion.text;

        ctx.interaction.announce(&Announcement::PhaseCompleted {
            phase: "specify".to_string(),
        });
        Ok(next)
    }
}
