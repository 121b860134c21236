//! Optional licensing rule, driven by the constitution's own "Licensing"
//! section. Absent that section, this rule is a no-op.

use acp_constitution::Constitution;
use acp_types::{Severity, Violation};

/// Check `text` (contract or data-model content) for a declared license
/// identifier the constitution's "Licensing" section denies.
#[must_use]
pub fn scan(constitution: &Constitution, artifact: &str, text: &str) -> Vec<Violation> {
    let Some(heading) = constitution.find_heading("Licensing") else {
        return Vec::new();
    };

    let denylist = denied_identifiers(&constitution.text, heading.line);
    if denylist.is_empty() {
        return Vec::new();
    }

    let mut violations = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let Some(declared) = line
            .trim()
            .strip_prefix("LICENSE")
            .and_then(|rest| rest.trim_start().strip_prefix('='))
            .map(|value| value.trim().trim_matches(|c| c == '"' || c == '\''))
        else {
            continue;
        };
        if denylist.iter().any(|denied| denied == declared) {
            violations.push(
                Violation::new(
                    "Licensing",
                    artifact,
                    Severity::High,
                    format!("declared license '{declared}' is disallowed by the project's Licensing principle"),
                    "choose a license identifier permitted by the constitution",
                )
                .at_line((line_idx + 1) as u32),
            );
        }
    }
    violations
}

/// Pull bracketed license identifiers (e.g. `GPL-3.0`) out of the body
/// following the "Licensing" heading, up to the next heading line.
fn denied_identifiers(constitution_text: &str, heading_line: u32) -> Vec<String> {
    constitution_text
        .lines()
        .skip(heading_line as usize)
        .take_while(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| {
            line.split(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '.')
                .filter(|token| token.contains('-') && token.chars().any(|c| c.is_ascii_digit()))
                .map(str::to_string)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use acp_constitution::PrincipleHeading;

    fn constitution_with_licensing(body: &str) -> Constitution {
        let text = format!("# Constitution\n\n## Licensing\n\n{body}\n");
        Constitution {
            headings: vec![PrincipleHeading {
                level: 2,
                title: "Licensing".to_string(),
                line: 3,
            }],
            text,
        }
    }

    #[test]
    fn no_licensing_section_means_no_violations() {
        let constitution = Constitution {
            text: "# Constitution\n".to_string(),
            headings: vec![],
        };
        assert!(scan(&constitution, "contract.yaml", "LICENSE = \"GPL-3.0\"").is_empty());
    }

    #[test]
    fn denied_license_is_flagged() {
        let constitution = constitution_with_licensing("No copyleft licenses: GPL-3.0 is disallowed.");
        let violations = scan(&constitution, "contract.yaml", "LICENSE = \"GPL-3.0\"\n");
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn permitted_license_is_not_flagged() {
        let constitution = constitution_with_licensing("No copyleft licenses: GPL-3.0 is disallowed.");
        let violations = scan(&constitution, "contract.yaml", "LICENSE = \"MIT\"\n");
        assert!(violations.is_empty());
    }
}
