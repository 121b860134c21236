//! The three agent-bearing nodes of the workflow graph and the routing
//! label a governance pass/fail produces for them.
//!
//! The graph is small and fixed (at most seven nodes: `specify`,
//! `governance(spec)`, `plan`, `governance(plan)`, `implement`,
//! `governance(impl)`, `error_handler`), so it is implemented as an
//! explicit `match` rather than a generic graph library.

use acp_agent::{Agent, ArchitectAgent, ImplementationAgent, SpecificationAgent};
use acp_types::PhaseId;

/// One of the three phase-agent nodes. `governance(X)` is not a distinct
/// variant here: the Governance agent always runs immediately after the
/// node's agent, so it is folded into the driving loop rather than the
/// node enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseNode {
    Specify,
    Plan,
    Implement,
}

impl PhaseNode {
    /// The node that should run given the run's current phase, or `None`
    /// if the run is already complete.
    #[must_use]
    pub const fn for_current_phase(phase: PhaseId) -> Option<Self> {
        match phase {
            PhaseId::Init => Some(Self::Specify),
            PhaseId::Specify => Some(Self::Plan),
            PhaseId::Plan => Some(Self::Implement),
            PhaseId::Implement | PhaseId::Complete => None,
        }
    }

    /// The phase a successful governance pass on this node advances to.
    /// `specify`/`plan` advance to their own named phase; `implement` is
    /// the graph's last node, so its success advances straight to the
    /// terminal `complete` phase.
    #[must_use]
    pub const fn target_phase(self) -> PhaseId {
        match self {
            Self::Specify => PhaseId::Specify,
            Self::Plan => PhaseId::Plan,
            Self::Implement => PhaseId::Complete,
        }
    }

    /// The phase whose work this node just finished, for `RunMetadata::
    /// phases_completed`. Distinct from [`Self::target_phase`]: `implement`
    /// *completes* the `implement` phase even though the run then
    /// *advances to* `complete`, and `phases_completed` must record the
    /// former to stay a prefix of `specify -> plan -> implement`.
    #[must_use]
    pub const fn completed_phase(self) -> PhaseId {
        match self {
            Self::Specify => PhaseId::Specify,
            Self::Plan => PhaseId::Plan,
            Self::Implement => PhaseId::Implement,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Specify => "specify",
            Self::Plan => "plan",
            Self::Implement => "implement",
        }
    }

    #[must_use]
    pub const fn expected_entry_phase(self) -> PhaseId {
        match self {
            Self::Specify => PhaseId::Init,
            Self::Plan => PhaseId::Specify,
            Self::Implement => PhaseId::Plan,
        }
    }

    #[must_use]
    pub fn agent(self) -> Box<dyn Agent> {
        match self {
            Self::Specify => Box::new(SpecificationAgent::new()),
            Self::Plan => Box::new(ArchitectAgent::new()),
            Self::Implement => Box::new(ImplementationAgent::new()),
        }
    }
}
