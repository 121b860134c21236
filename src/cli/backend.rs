//! Binds the engine's two injected collaborators - the LLM client and the
//! human interaction port - to what a real terminal invocation has
//! available. The engine itself reads no environment; this is the one
//! place that does.

use acp_interaction::{InteractionPort, NonInteractivePort, TerminalPort};
use acp_llm::{LlmBackend, MockBackend};

/// The choice of model provider is out of scope for this engine: the only
/// supported binding is the mock backend, used whenever `ACP_LLM_PROVIDER`
/// is unset, set to `mock`, or no provider credentials are configured. Any
/// other value is accepted but still resolves to the mock backend, with a
/// warning, since no real provider client is wired up.
#[must_use]
pub fn select_llm_backend() -> Box<dyn LlmBackend> {
    match std::env::var("ACP_LLM_PROVIDER") {
        Ok(provider) if provider != "mock" => {
            tracing::warn!(provider = %provider, "no real LLM provider is wired up; falling back to mock");
        }
        _ => {}
    }
    Box::new(MockBackend::fixed(String::new()))
}

/// `--force` runs non-interactively: no pre-flight questions are answered
/// and a governance failure defaults to `Abort` rather than prompting.
/// Otherwise the terminal is used, which itself refuses to block when
/// stdin is not a TTY.
#[must_use]
pub fn select_interaction_port(force: bool) -> Box<dyn InteractionPort> {
    if force {
        Box::new(NonInteractivePort::new(vec![], None))
    } else {
        Box::new(TerminalPort::new())
    }
}
