//! Schema migration chain. Migrators are pure functions over the raw JSON
//! value of a checkpoint file; they never reach back into the State Model
//! directly, so a migrator written today keeps working even if `State`'s
//! Rust type later changes shape again.

use serde_json::Value;
use thiserror::Error;

use acp_types::SCHEMA_VERSION;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("no migration path from schema version '{0}' to '{1}'")]
    NoPath(String, String),
    #[error("migrator for {0} -> {1} produced malformed JSON: {2}")]
    MalformedOutput(String, String, String),
}

type Migrator = fn(Value) -> Result<Value, MigrationError>;

struct Migration {
    from: &'static str,
    to: &'static str,
    migrate: Migrator,
}

/// Registered migrations, in application order. A real release only ever
/// appends to this list; it never rewrites an already-shipped entry.
fn registry() -> Vec<Migration> {
    vec![Migration {
        from: "0.9.0",
        to: "1.0.0",
        migrate: migrate_0_9_0_to_1_0_0,
    }]
}

/// `0.9.0` tracked open planning questions under `state.planning.blockers`;
/// `1.0.0` renamed the field to `unknowns` to match the Architect agent's
/// vocabulary. This is the illustrative migrator exercised by the
/// migration-chain test.
fn migrate_0_9_0_to_1_0_0(mut doc: Value) -> Result<Value, MigrationError> {
    let planning = doc
        .get_mut("state")
        .and_then(|s| s.get_mut("planning"))
        .ok_or_else(|| {
            MigrationError::MalformedOutput(
                "0.9.0".to_string(),
                "1.0.0".to_string(),
                "missing state.planning".to_string(),
            )
        })?;

    if let Some(blockers) = planning.as_object_mut().and_then(|obj| obj.remove("blockers")) {
        planning["unknowns"] = blockers;
    }

    doc["schema_version"] = Value::String("1.0.0".to_string());
    if let Some(state) = doc.get_mut("state") {
        state["schema_version"] = Value::String("1.0.0".to_string());
    }

    Ok(doc)
}

/// Run the migration chain starting at `from_version` until `doc` is at
/// [`SCHEMA_VERSION`]. Returns the migrated document and whether any
/// migration actually ran.
///
/// # Errors
///
/// Returns [`MigrationError::NoPath`] if no registered migration starts at
/// the stored version and it is not already current.
pub fn migrate_to_current(mut doc: Value, from_version: &str) -> Result<(Value, bool), MigrationError> {
    if from_version == SCHEMA_VERSION {
        return Ok((doc, false));
    }

    let migrations = registry();
    let mut current = from_version.to_string();
    let mut migrated_any = false;

    loop {
        if current == SCHEMA_VERSION {
            return Ok((doc, migrated_any));
        }
        let Some(step) = migrations.iter().find(|m| m.from == current) else {
            return Err(MigrationError::NoPath(current, SCHEMA_VERSION.to_string()));
        };
        doc = (step.migrate)(doc)?;
        current = step.to.to_string();
        migrated_any = true;
    }
}
