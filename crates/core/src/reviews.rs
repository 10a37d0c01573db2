//! Review and comment constants and validation.

use crate::error::{CoreError, FieldErrors};

/// Lowest accepted review score.
pub const MIN_SCORE: i32 = 1;

/// Highest accepted review score.
pub const MAX_SCORE: i32 = 10;

/// Message returned when a user reviews the same title twice.
pub const DUPLICATE_REVIEW_MESSAGE: &str = "You have already reviewed this title.";

/// Validate a review score.
pub fn validate_score(score: i32, errors: &mut FieldErrors) {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        errors.add(
            "score",
            format!("Ensure this value is between {MIN_SCORE} and {MAX_SCORE}."),
        );
    }
}

/// Validate review or comment text: must not be blank.
pub fn validate_text(text: &str, errors: &mut FieldErrors) {
    if text.trim().is_empty() {
        errors.add("text", "This field may not be blank.");
    }
}

/// Validate a new review.
pub fn validate_new_review(text: &str, score: i32) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    validate_text(text, &mut errors);
    validate_score(score, &mut errors);
    errors.into_result()
}

/// The error for a second review of the same title by the same author.
pub fn duplicate_review() -> CoreError {
    FieldErrors::single("non_field_errors", DUPLICATE_REVIEW_MESSAGE)
}
