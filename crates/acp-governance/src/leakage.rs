//! Detects concrete implementation details (languages, databases, frameworks,
//! cloud providers) named in a specification, which should stay
//! technology-agnostic until the planning phase.

use acp_types::{Severity, Violation};

const LEAKAGE_KEYWORDS: &[&str] = &[
    // Languages
    "Rust", "Python", "TypeScript", "JavaScript", "Java", "Golang", "Go", "Kotlin", "Ruby",
    "PHP", "C++", "C#",
    // Databases
    "PostgreSQL", "Postgres", "MySQL", "MongoDB", "Redis", "SQLite", "DynamoDB", "Cassandra",
    "Elasticsearch",
    // Frameworks
    "React", "Angular", "Vue", "Django", "Flask", "Rails", "Express", "Spring Boot", "Next.js",
    // Cloud providers
    "AWS", "Azure", "Google Cloud", "GCP", "Cloudflare", "Kubernetes", "Docker",
];

/// Whether `keyword` occurs in `line` with no alphanumeric character on
/// either side - so `"Go"` matches "written in Go." but not "Google" or
/// "ago", without the caller having to hand-tune a trailing-space guard
/// per keyword.
fn contains_word(line: &str, keyword: &str) -> bool {
    let mut search_from = 0;
    while let Some(offset) = line[search_from..].find(keyword) {
        let start = search_from + offset;
        let end = start + keyword.len();
        let before_is_alnum = line[..start].chars().next_back().is_some_and(char::is_alphanumeric);
        let after_is_alnum = line[end..].chars().next().is_some_and(char::is_alphanumeric);
        if !before_is_alnum && !after_is_alnum {
            return true;
        }
        search_from = start + 1;
    }
    false
}

/// Scan `text` for implementation-leakage keywords, returning one violation
/// per first-matching keyword occurrence (deduplicated by keyword).
#[must_use]
pub fn scan(artifact: &str, text: &str) -> Vec<Violation> {
    let mut found = std::collections::BTreeSet::new();
    let mut violations = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        for keyword in LEAKAGE_KEYWORDS {
            if contains_word(line, keyword) && found.insert(*keyword) {
                violations.push(
                    Violation::new(
                        "BUILTIN-LEAKAGE",
                        artifact,
                        Severity::High,
                        format!("specification names a concrete implementation detail: '{keyword}'"),
                        "describe the requirement in technology-agnostic terms; defer the choice to the planning phase",
                    )
                    .at_line((line_idx + 1) as u32),
                );
            }
        }
    }

    violations
}
