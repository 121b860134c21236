//! acp - a governed, spec-driven development workflow engine.
//!
//! The engine itself lives in `acp-engine`; this crate wires it to a
//! terminal: argument parsing, config discovery, logging, and the LLM/
//! interaction bindings a real invocation needs.

pub mod cli;

pub use acp_config::Config;
pub use acp_engine::{Engine, EngineError, RunStatusView};
pub use acp_utils::{AcpError, UserFriendlyError};
