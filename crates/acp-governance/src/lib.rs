//! Rule-based governance validation: given a constitution and a candidate
//! artifact, return a list of structured violations. Rules are pattern
//! predicates over the artifact text, not an LLM call.

mod leakage;
mod licensing;
mod sections;
mod secrets;

use acp_constitution::Constitution;
use acp_types::{ArtifactKind, Violation};

/// Run every applicable rule against `text` and return the combined,
/// severity-sorted (most severe first) violation list. An empty list means
/// the artifact passes governance.
#[must_use]
pub fn validate(
    constitution: &Constitution,
    kind: ArtifactKind,
    artifact: &str,
    text: &str,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if kind == ArtifactKind::Spec {
        violations.extend(leakage::scan(artifact, text));
    }
    if kind == ArtifactKind::Code {
        violations.extend(secrets::scan(artifact, text));
    }
    violations.extend(sections::scan(kind, artifact, text));
    if matches!(kind, ArtifactKind::Contract | ArtifactKind::DataModel) {
        violations.extend(licensing::scan(constitution, artifact, text));
    }

    violations.sort_by(|a, b| b.severity.cmp(&a.severity));
    violations
}
