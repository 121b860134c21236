//! Slug derivation for run ids.
//!
//! A run id has the form `NNN-slug`: a three-digit zero-padded ordinal
//! followed by a slug derived from the feature description.

use unicode_normalization::UnicodeNormalization;

/// Maximum slug length in bytes. Long descriptions are truncated at the
/// last hyphen boundary at or before this limit, never mid-word.
pub const MAX_SLUG_LEN: usize = 60;

/// Derive a run-id slug from a free-text feature description: normalize
/// Unicode (NFKC), lowercase, strip non-word characters, collapse
/// whitespace/punctuation runs to single hyphens, and bound the length.
#[must_use]
pub fn slugify(description: &str) -> String {
    let normalized: String = description.nfkc().collect();
    let lowered = normalized.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    truncate_at_hyphen(&slug, MAX_SLUG_LEN)
}

fn truncate_at_hyphen(slug: &str, max_len: usize) -> String {
    if slug.len() <= max_len {
        return slug.to_string();
    }
    let mut cut = max_len;
    while cut > 0 && !slug.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &slug[..cut];
    match truncated.rfind('-') {
        Some(idx) if idx > 0 => truncated[..idx].to_string(),
        _ => truncated.to_string(),
    }
}

/// Format a three-digit zero-padded ordinal plus slug into a run id.
#[must_use]
pub fn format_run_id(ordinal: u32, slug: &str) -> String {
    format!("{ordinal:03}-{slug}")
}
