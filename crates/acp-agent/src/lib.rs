//! The pluggable phase-agent abstraction (the `Agent` trait and its shared
//! `AgentContext`) and the four concrete phase agents that drive a run from
//! a feature description to validated, test-first code.

mod architect;
mod context;
mod governance;
mod implementation;
mod markdown;
mod specification;

pub use architect::ArchitectAgent;
pub use context::{Agent, AgentContext, AgentError};
pub use governance::GovernanceAgent;
pub use implementation::ImplementationAgent;
pub use specification::SpecificationAgent;
