//! Durable, crash-safe persistence of [`acp_types::State`] plus per-run
//! metadata, one JSON file per run under `<root>/.acp/state/<run-id>.json`.

use std::path::{Path, PathBuf};

use acp_types::State;
use acp_utils::atomic_write::write_file_atomic;
use chrono::Utc;
use thiserror::Error;
use tracing::warn;

use crate::migration::{MigrationError, migrate_to_current};
use crate::model::{CheckpointFile, RunMetadata};

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("no checkpoint found for run '{0}'")]
    NotFound(String),
    #[error("checkpoint for run '{0}' is corrupted: {1}")]
    Corrupted(String, String),
    #[error("schema migration failed: {0}")]
    Migration(#[from] MigrationError),
    #[error("state invariant violated after load: {0}")]
    Invalid(#[from] acp_types::StateError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists and retrieves checkpoints under a single `.acp/state/` directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    state_dir: PathBuf,
}

impl CheckpointStore {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            state_dir: root.join(".acp").join("state"),
        }
    }

    fn path_for(&self, run_id: &str) -> PathBuf {
        self.state_dir.join(format!("{run_id}.json"))
    }

    /// Validate `state`, serialize with stable key ordering, and write it
    /// atomically. `metadata.updated_at` is refreshed; `created_at` is
    /// preserved from the prior file if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Invalid`] if `state` fails invariant
    /// validation, or an I/O error if the write fails.
    pub fn save(&self, mut state: State, mut metadata: RunMetadata) -> Result<(), CheckpointError> {
        let about_to_be_in_progress = metadata.status == acp_types::RunStatus::InProgress;
        acp_types::validate(&state, about_to_be_in_progress)?;

        if let Ok(existing) = self.by_id(&metadata.run_id) {
            metadata.created_at = existing.created_at;
        }
        metadata.updated_at = Utc::now();
        metadata.phase = state.control.phase;
        state.schema_version = acp_types::SCHEMA_VERSION.to_string();

        let file = CheckpointFile {
            schema_version: acp_types::SCHEMA_VERSION.to_string(),
            metadata,
            state,
            extra: serde_json::Map::new(),
        };

        let json = serde_json::to_string_pretty(&sorted(&file)?)
            .map_err(|e| CheckpointError::Corrupted(file.metadata.run_id.clone(), e.to_string()))?;

        write_file_atomic(&self.path_for(&file.metadata.run_id), &json)?;
        Ok(())
    }

    /// Read and migrate-if-needed the checkpoint for `run_id`.
    ///
    /// # Errors
    ///
    /// [`CheckpointError::NotFound`] if absent, [`CheckpointError::Corrupted`]
    /// on a JSON parse failure, [`CheckpointError::Migration`] if no
    /// migration path exists from the stored schema version.
    pub fn load(&self, run_id: &str) -> Result<(State, RunMetadata, bool), CheckpointError> {
        let path = self.path_for(run_id);
        let content = std::fs::read_to_string(&path)
            .map_err(|_| CheckpointError::NotFound(run_id.to_string()))?;

        let raw: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| CheckpointError::Corrupted(run_id.to_string(), e.to_string()))?;

        let from_version = raw
            .get("schema_version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CheckpointError::Corrupted(run_id.to_string(), "missing schema_version".to_string())
            })?
            .to_string();

        let (migrated_doc, migrated) = migrate_to_current(raw, &from_version)?;

        let file: CheckpointFile = serde_json::from_value(migrated_doc)
            .map_err(|e| CheckpointError::Corrupted(run_id.to_string(), e.to_string()))?;

        acp_types::validate(&file.state, false)?;

        Ok((file.state, file.metadata, migrated))
    }

    /// Look up metadata by exact run id without loading the full state.
    ///
    /// # Errors
    ///
    /// [`CheckpointError::NotFound`] / [`CheckpointError::Corrupted`] as in
    /// [`CheckpointStore::load`].
    pub fn by_id(&self, run_id: &str) -> Result<RunMetadata, CheckpointError> {
        self.load(run_id).map(|(_, metadata, _)| metadata)
    }

    /// Enumerate all readable checkpoints, most-recently-updated first.
    /// Corrupted files are skipped with a logged warning, never fatal.
    #[must_use]
    pub fn list(&self) -> Vec<RunMetadata> {
        let Ok(entries) = std::fs::read_dir(&self.state_dir) else {
            return Vec::new();
        };

        let mut metadata = Vec::new();
        for entry in entries.flatten() {
            let Some(run_id) = entry
                .path()
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
            else {
                continue;
            };
            match self.by_id(&run_id) {
                Ok(m) => metadata.push(m),
                Err(e) => warn!(run_id, error = %e, "skipping unreadable checkpoint"),
            }
        }

        metadata.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        metadata
    }

    /// The most recently updated run id, if any.
    #[must_use]
    pub fn latest(&self) -> Option<String> {
        self.list().into_iter().next().map(|m| m.run_id)
    }

    /// Scan existing checkpoints for the highest run ordinal in use.
    #[must_use]
    pub fn highest_ordinal(&self) -> u32 {
        self.list()
            .iter()
            .filter_map(|m| m.run_id.split('-').next())
            .filter_map(|s| s.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
    }
}

/// Re-serialize through a `BTreeMap`-backed value so nested object keys are
/// sorted, making checkpoint diffs meaningful.
fn sorted(file: &CheckpointFile) -> Result<serde_json::Value, CheckpointError> {
    let value = serde_json::to_value(file)
        .map_err(|e| CheckpointError::Corrupted(file.metadata.run_id.clone(), e.to_string()))?;
    Ok(sort_value(value))
}

fn sort_value(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_value(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}
