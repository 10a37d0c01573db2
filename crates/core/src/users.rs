//! User field constants and validation.
//!
//! Validators push into a shared [`FieldErrors`] so one response can report
//! every bad field at once.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::error::{CoreError, FieldErrors};
use crate::roles::Role;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum length of an email address.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length of `first_name` / `last_name`.
pub const MAX_NAME_LENGTH: usize = 150;

/// Usernames that collide with reserved routes (`/users/me`).
pub const BANNED_USERNAMES: &[&str] = &["me"];

/// Letters, digits, and `@ . + - _` only.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));

/// Validate a username: required, length-limited, restricted charset, not banned.
pub fn validate_username(username: &str, errors: &mut FieldErrors) {
    if username.is_empty() {
        errors.add("username", "This field may not be blank.");
        return;
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.add(
            "username",
            format!("Ensure this field has no more than {MAX_USERNAME_LENGTH} characters."),
        );
    }
    if !USERNAME_RE.is_match(username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    if BANNED_USERNAMES.contains(&username) {
        errors.add("username", format!("Using the name \"{username}\" is not allowed."));
    }
}

/// Validate an email address: required, length-limited, well-formed.
pub fn validate_email(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        errors.add("email", "This field may not be blank.");
        return;
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        errors.add(
            "email",
            format!("Ensure this field has no more than {MAX_EMAIL_LENGTH} characters."),
        );
    }
    if !email.validate_email() {
        errors.add("email", "Enter a valid email address.");
    }
}

/// Validate an optional personal name field (`first_name` / `last_name`).
pub fn validate_person_name(field: &'static str, value: &str, errors: &mut FieldErrors) {
    if value.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            field,
            format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
        );
    }
}

/// Parse a role name, recording a field error if it is unknown.
pub fn parse_role(value: &str, errors: &mut FieldErrors) -> Option<Role> {
    match value.parse::<Role>() {
        Ok(role) => Some(role),
        Err(e) => {
            errors.add("role", e.to_string());
            None
        }
    }
}

/// Validate the sign-up payload.
pub fn validate_signup(username: &str, email: &str) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    validate_username(username, &mut errors);
    validate_email(email, &mut errors);
    errors.into_result()
}
