//! Loads `<root>/.acp/templates/constitution.md` and structurally validates
//! that the top-level sections an agent needs are present, following the
//! same "required headers, at least one present" approach the Governance
//! Validator uses for generated artifacts.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstitutionError {
    #[error("constitution not found at {0}; run `acp init` first")]
    NotFound(String),
    #[error("constitution is missing required section(s): {0}")]
    MissingSections(String),
    #[error("I/O error reading constitution: {0}")]
    Io(#[from] std::io::Error),
}

const REQUIRED_TOP_LEVEL_SECTIONS: &[&str] = &["Core Principles", "Quality Standards"];

/// One `##`/`###` heading found in the constitution text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipleHeading {
    pub level: u8,
    pub title: String,
    pub line: u32,
}

/// The loaded, structurally valid principles document.
#[derive(Debug, Clone)]
pub struct Constitution {
    pub text: String,
    pub headings: Vec<PrincipleHeading>,
}

impl Constitution {
    /// Find a heading whose title matches `name` case-insensitively.
    #[must_use]
    pub fn find_heading(&self, name: &str) -> Option<&PrincipleHeading> {
        self.headings
            .iter()
            .find(|h| h.title.eq_ignore_ascii_case(name))
    }
}

/// Load the constitution from `<root>/.acp/templates/constitution.md`.
///
/// # Errors
///
/// [`ConstitutionError::NotFound`] if the file is absent,
/// [`ConstitutionError::MissingSections`] if a required top-level section
/// (`Core Principles`, `Quality Standards`) is missing.
pub fn load(root: &Path) -> Result<Constitution, ConstitutionError> {
    let path = root.join(".acp").join("templates").join("constitution.md");
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConstitutionError::NotFound(path.display().to_string()))?;

    let headings = parse_headings(&text);
    let missing: Vec<&str> = REQUIRED_TOP_LEVEL_SECTIONS
        .iter()
        .filter(|required| !headings.iter().any(|h| h.title.eq_ignore_ascii_case(required)))
        .copied()
        .collect();

    if !missing.is_empty() {
        return Err(ConstitutionError::MissingSections(missing.join(", ")));
    }

    Ok(Constitution { text, headings })
}

/// Parse `##`/`###` markdown headings, recording their level, title, and
/// 1-indexed line number.
fn parse_headings(text: &str) -> Vec<PrincipleHeading> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let trimmed = line.trim_start();
            let level = trimmed.chars().take_while(|&c| c == '#').count();
            if !(2..=3).contains(&level) {
                return None;
            }
            let title = trimmed[level..].trim();
            if title.is_empty() {
                return None;
            }
            Some(PrincipleHeading {
                level: level as u8,
                title: title.to_string(),
                line: (idx + 1) as u32,
            })
        })
        .collect()
}
