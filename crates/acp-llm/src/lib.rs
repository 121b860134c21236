//! LLM client abstraction. Phase agents issue prompts through `LlmBackend`;
//! the engine never talks to a model directly. A `MockBackend` is the
//! supported binding for tests and for runs with no provider configured.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM call timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("LLM call failed: {0}")]
    Provider(String),
}

/// Role of a message in a single-turn or multi-turn prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single prompt, as an ordered list of messages.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    pub messages: Vec<Message>,
}

impl Prompt {
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// An LLM backend's response: raw text plus which model actually answered.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

/// Trait for LLM backend implementations. Agents hold a `&dyn LlmBackend`
/// and never see provider-specific detail.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Invoke the model with `prompt`, returning its raw text response.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on transport failure, provider error, or timeout.
    async fn complete(&self, prompt: &Prompt) -> Result<Completion, LlmError>;

    /// The model alias this backend answers as (used in checkpoint metadata
    /// and logging).
    fn model(&self) -> &str;
}

/// Deterministic backend used in tests and whenever no real provider is
/// configured (`ACP_LLM_PROVIDER=mock`, or no credentials present). Replies
/// are driven by a queue of canned responses consumed in order; the last
/// response repeats once the queue is exhausted, so agent code calling it
/// an unplanned extra time does not panic.
pub struct MockBackend {
    responses: std::sync::Mutex<Vec<String>>,
    model: String,
}

impl MockBackend {
    #[must_use]
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            model: "mock".to_string(),
        }
    }

    /// A backend that always returns the same fixed response.
    #[must_use]
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, _prompt: &Prompt) -> Result<Completion, LlmError> {
        let mut queue = self.responses.lock().expect("mock backend mutex poisoned");
        let text = if queue.len() > 1 {
            queue.remove(0)
        } else {
            queue.first().cloned().unwrap_or_default()
        };
        Ok(Completion {
            text,
            model: self.model.clone(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
