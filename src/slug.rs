//! Slug helpers shared by the store and the HTTP layer.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

pub const MIN_SLUG_LEN: usize = 3;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref STRIP_RE: Regex = Regex::new(r"[^a-z0-9-]").unwrap();
    static ref HYPHENS_RE: Regex = Regex::new(r"-{2,}").unwrap();
}

/// Canonical key used for every comparison and write.
pub fn normalize(slug: &str) -> String {
    slug.trim().to_lowercase()
}

/// Build a slug from free text: lower-case, trim, whitespace runs become a
/// hyphen, anything else outside `[a-z0-9-]` is dropped.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let hyphenated = WHITESPACE_RE.replace_all(&lowered, "-");
    let stripped = STRIP_RE.replace_all(&hyphenated, "");
    let collapsed = HYPHENS_RE.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Validate an already-normalized slug.
pub fn validate(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(ValidationError::EmptySlug);
    }
    if slug.chars().count() < MIN_SLUG_LEN {
        return Err(ValidationError::SlugTooShort { min: MIN_SLUG_LEN });
    }
    if !SLUG_RE.is_match(slug) {
        return Err(ValidationError::MalformedSlug);
    }
    Ok(())
}

/// Public page path for a slug.
pub fn public_path(slug: &str) -> String {
    format!("/portfolio/{}", normalize(slug))
}
