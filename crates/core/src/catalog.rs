//! Category, genre, and title validation.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::error::{CoreError, FieldErrors};
use crate::types::Timestamp;

/// Maximum length of a category, genre, or title name.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length of a category or genre slug.
pub const MAX_SLUG_LENGTH: usize = 50;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/// Validate a display name: required and length-limited.
pub fn validate_name(name: &str, errors: &mut FieldErrors) {
    if name.trim().is_empty() {
        errors.add("name", "This field may not be blank.");
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            "name",
            format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
        );
    }
}

/// Validate a slug: required, length-limited, `[-a-zA-Z0-9_]` only.
pub fn validate_slug(slug: &str, errors: &mut FieldErrors) {
    if slug.is_empty() {
        errors.add("slug", "This field may not be blank.");
        return;
    }
    if slug.len() > MAX_SLUG_LENGTH {
        errors.add(
            "slug",
            format!("Ensure this field has no more than {MAX_SLUG_LENGTH} characters."),
        );
    }
    if !SLUG_RE.is_match(slug) {
        errors.add(
            "slug",
            "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
        );
    }
}

/// Validate a release year: non-negative and not after the current year.
pub fn validate_year(year: i32, now: Timestamp, errors: &mut FieldErrors) {
    let current = now.year();
    if year < 0 {
        errors.add("year", "Ensure this value is greater than or equal to 0.");
    } else if year > current {
        errors.add(
            "year",
            format!("Ensure this value is less than or equal to {current}."),
        );
    }
}

/// Validate a new category or genre.
pub fn validate_category_like(name: &str, slug: &str) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    validate_name(name, &mut errors);
    validate_slug(slug, &mut errors);
    errors.into_result()
}
