use acp_types::{PhaseId, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-run metadata kept alongside the State in a checkpoint file. This is
/// the source of truth for run enumeration (`history`) and auto-resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub name: String,
    pub thread_id: String,
    pub status: RunStatus,
    pub phase: PhaseId,
    pub phases_completed: Vec<PhaseId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub spec_path: String,
}

impl RunMetadata {
    #[must_use]
    pub fn new(run_id: String, name: String, thread_id: String, spec_path: String) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            name,
            thread_id,
            status: RunStatus::Pending,
            phase: PhaseId::Init,
            phases_completed: Vec::new(),
            created_at: now,
            updated_at: now,
            spec_path,
        }
    }
}

/// The on-disk checkpoint document: `schema_version` + `metadata` + `state`.
/// Unknown top-level keys are preserved via `extra` (forward-compatible
/// passthrough), per §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointFile {
    pub schema_version: String,
    pub metadata: RunMetadata,
    pub state: acp_types::State,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
