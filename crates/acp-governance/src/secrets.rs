//! Secret-shape detection in generated code artifacts. Scaled down from a
//! full redaction catalogue to the shapes relevant to freshly generated
//! code: long hex blobs, high-entropy provider-token prefixes, and plain
//! `KEY=value` assignments.

use acp_types::{Severity, Violation};
use regex::Regex;
use std::sync::LazyLock;

struct SecretPattern {
    id: &'static str,
    regex: &'static str,
    description: &'static str,
}

static PATTERNS: &[SecretPattern] = &[
    SecretPattern {
        id: "long_hex_blob",
        regex: r"\b[0-9a-fA-F]{32,}\b",
        description: "long hexadecimal string, resembling a hashed or raw secret",
    },
    SecretPattern {
        id: "openai_style_token",
        regex: r"sk-[A-Za-z0-9_-]{20,}",
        description: "`sk-`-prefixed high-entropy token, resembling an LLM provider API key",
    },
    SecretPattern {
        id: "plain_assignment",
        regex: r#"(?i)\b(API_KEY|PASSWORD|SECRET)\s*=\s*["'][^"']+["']"#,
        description: "plaintext credential assignment",
    },
];

static COMPILED: LazyLock<Vec<(&'static SecretPattern, Regex)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|def| (def, Regex::new(def.regex).expect("built-in secret pattern is valid regex")))
        .collect()
});

/// Scan `text` (a generated code artifact) for secret-shaped substrings.
#[must_use]
pub fn scan(artifact: &str, text: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        for (def, regex) in COMPILED.iter() {
            if regex.is_match(line) {
                violations.push(
                    Violation::new(
                        format!("BUILTIN-SECRET-{}", def.id.to_uppercase()),
                        artifact,
                        Severity::Critical,
                        format!("code contains a likely secret: {}", def.description),
                        "remove the literal value and load it from configuration or environment instead",
                    )
                    .at_line((line_idx + 1) as u32),
                );
            }
        }
    }

    violations
}
