//! Required-section schema per artifact kind, the structural half of
//! governance: every generated artifact must carry the headings (or, for
//! contracts and quickstarts, the shape) its kind demands.

use acp_types::{ArtifactKind, Severity, Violation};

fn required_headings(kind: ArtifactKind) -> &'static [&'static str] {
    match kind {
        ArtifactKind::Spec => &["## User Scenarios", "## Requirements", "## Success Criteria"],
        ArtifactKind::Plan => &["## Overview", "## Architecture"],
        ArtifactKind::Research | ArtifactKind::Quickstart | ArtifactKind::DataModel
        | ArtifactKind::Contract | ArtifactKind::Code => &[],
    }
}

/// Check `text` against the required-section schema for `kind`.
#[must_use]
pub fn scan(kind: ArtifactKind, artifact: &str, text: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    for heading in required_headings(kind) {
        if !text.contains(heading) {
            violations.push(Violation::new(
                "BUILTIN-REQUIRED-SECTION",
                artifact,
                Severity::Medium,
                format!("missing required section '{heading}'"),
                format!("add a '{heading}' section"),
            ));
        }
    }

    match kind {
        ArtifactKind::DataModel => {
            if !text.lines().any(|line| line.trim_start().starts_with("## ")) {
                violations.push(Violation::new(
                    "BUILTIN-REQUIRED-SECTION",
                    artifact,
                    Severity::Medium,
                    "data model has no entity headings",
                    "add at least one '## <Entity>' heading",
                ));
            }
        }
        ArtifactKind::Quickstart => {
            if !text.contains("```") {
                violations.push(Violation::new(
                    "BUILTIN-REQUIRED-SECTION",
                    artifact,
                    Severity::Medium,
                    "quickstart has no fenced code block",
                    "add at least one fenced code block showing usage",
                ));
            }
        }
        ArtifactKind::Contract => {
            match serde_yaml::from_str::<serde_yaml::Value>(text) {
                Ok(serde_yaml::Value::Mapping(map)) => {
                    let has_name = map
                        .iter()
                        .any(|(k, _)| k.as_str() == Some("name"));
                    if !has_name {
                        violations.push(Violation::new(
                            "BUILTIN-REQUIRED-SECTION",
                            artifact,
                            Severity::Medium,
                            "contract YAML is missing a top-level 'name' key",
                            "add a top-level 'name' key identifying the contract",
                        ));
                    }
                }
                _ => violations.push(Violation::new(
                    "BUILTIN-REQUIRED-SECTION",
                    artifact,
                    Severity::Medium,
                    "contract does not parse as a YAML mapping",
                    "emit valid YAML with a top-level 'name' key",
                )),
            }
        }
        _ => {}
    }

    violations
}
