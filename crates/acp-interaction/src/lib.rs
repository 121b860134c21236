//! The narrow callback surface the engine uses to ask pre-flight questions,
//! announce progress, and collect governance remediation decisions. The
//! engine never reads stdin directly; it only ever talks to `dyn
//! InteractionPort`.

use std::io::IsTerminal;

use acp_types::Violation;
use async_trait::async_trait;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("no answers were supplied for {0} pre-flight question(s)")]
    NoAnswers(usize),
    #[error("terminal interaction failed: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("stdin is not a terminal and no non-interactive answer was configured")]
    NotInteractive,
}

/// A single clarifying question emitted by the Specification agent.
#[derive(Debug, Clone)]
pub struct PreflightQuestion {
    pub ordinal: usize,
    pub question: String,
    pub context: Option<String>,
}

pub type Answer = String;

/// Progress notification pushed to the user; never causes the engine to
/// block or fail.
#[derive(Debug, Clone)]
pub enum Announcement {
    PhaseStarted { phase: String },
    PhaseCompleted { phase: String },
    SkippingCompletedPhases { phases: Vec<String> },
    Retrying { phase: String, attempt: u32, max: u32 },
}

/// The human decision after a governance failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    Regenerate,
    EditConstitution,
    Abort,
    Ignore,
}

#[async_trait]
pub trait InteractionPort: Send + Sync {
    /// Ask all `questions` as a single batch; blocking, ordered,
    /// all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError`] if answers cannot be collected.
    async fn ask(&self, questions: &[PreflightQuestion]) -> Result<Vec<Answer>, InteractionError>;

    /// Progress notification. Never blocks, never fails the engine; any
    /// internal display failure is logged and swallowed.
    fn announce(&self, event: &Announcement);

    /// Structured notification of governance findings.
    fn report_violations(&self, violations: &[Violation]);

    /// Ask the user how to proceed after a governance failure.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError`] if a choice cannot be collected.
    async fn remediate(
        &self,
        violations: &[Violation],
        allow_ignore: bool,
    ) -> Result<Remediation, InteractionError>;
}

/// Reads menu choices from stdin. Falls back to an error rather than
/// hanging when stdin is not a terminal.
pub struct TerminalPort;

impl TerminalPort {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn require_terminal() -> Result<(), InteractionError> {
        if std::io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(InteractionError::NotInteractive)
        }
    }
}

impl Default for TerminalPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractionPort for TerminalPort {
    async fn ask(&self, questions: &[PreflightQuestion]) -> Result<Vec<Answer>, InteractionError> {
        Self::require_terminal()?;

        let mut answers = Vec::with_capacity(questions.len());
        for question in questions {
            let prompt = match &question.context {
                Some(context) => format!("{} ({context})", question.question),
                None => question.question.clone(),
            };
            let answer: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .interact_text()?;
            answers.push(answer);
        }

        if answers.is_empty() || answers.iter().any(String::is_empty) {
            return Err(InteractionError::NoAnswers(questions.len()));
        }
        Ok(answers)
    }

    fn announce(&self, event: &Announcement) {
        match event {
            Announcement::PhaseStarted { phase } => println!("-> {phase}"),
            Announcement::PhaseCompleted { phase } => println!("   {phase} complete"),
            Announcement::SkippingCompletedPhases { phases } => {
                println!("Skipping completed phases: {}", phases.join(", "));
            }
            Announcement::Retrying { phase, attempt, max } => {
                println!("   retrying {phase} ({attempt}/{max})");
            }
        }
    }

    fn report_violations(&self, violations: &[Violation]) {
        for violation in violations {
            println!(
                "[{}] {} ({}{}): {}",
                violation.severity,
                violation.principle,
                violation.artifact,
                violation
                    .line
                    .map(|line| format!(":{line}"))
                    .unwrap_or_default(),
                violation.description
            );
        }
    }

    async fn remediate(
        &self,
        violations: &[Violation],
        allow_ignore: bool,
    ) -> Result<Remediation, InteractionError> {
        Self::require_terminal()?;
        self.report_violations(violations);

        let mut options = vec!["Regenerate", "Edit constitution", "Abort"];
        if allow_ignore {
            options.push("Ignore");
        }

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("How would you like to proceed?")
            .items(&options)
            .default(0)
            .interact()?;

        Ok(match options[selection] {
            "Regenerate" => Remediation::Regenerate,
            "Edit constitution" => Remediation::EditConstitution,
            "Ignore" => Remediation::Ignore,
            _ => Remediation::Abort,
        })
    }
}

/// Used in tests and for `--force`/pre-answered runs: answers and the
/// remediation decision are supplied up front. A `remediate` call with no
/// configured response defaults to `Abort`.
pub struct NonInteractivePort {
    answers: std::sync::Mutex<std::collections::VecDeque<Answer>>,
    remediation: Option<Remediation>,
}

impl NonInteractivePort {
    #[must_use]
    pub fn new(answers: Vec<Answer>, remediation: Option<Remediation>) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers.into()),
            remediation,
        }
    }
}

#[async_trait]
impl InteractionPort for NonInteractivePort {
    async fn ask(&self, questions: &[PreflightQuestion]) -> Result<Vec<Answer>, InteractionError> {
        let mut queue = self.answers.lock().expect("non-interactive port mutex poisoned");
        if queue.len() < questions.len() {
            return Err(InteractionError::NoAnswers(questions.len()));
        }
        Ok(questions.iter().map(|_| queue.pop_front().unwrap()).collect())
    }

    fn announce(&self, _event: &Announcement) {}

    fn report_violations(&self, _violations: &[Violation]) {}

    async fn remediate(
        &self,
        _violations: &[Violation],
        _allow_ignore: bool,
    ) -> Result<Remediation, InteractionError> {
        Ok(self.remediation.unwrap_or(Remediation::Abort))
    }
}
