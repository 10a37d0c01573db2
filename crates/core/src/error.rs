use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Field-level validation messages, keyed by the offending input field.
///
/// Serializes as `{ "field": ["message", ...] }`. Keys are ordered so error
/// bodies are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise [`CoreError::InvalidFields`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidFields(self))
        }
    }

    /// Build a single-field error in one call.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> CoreError {
        let mut errors = Self::new();
        errors.add(field, message);
        CoreError::InvalidFields(errors)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Validation failed: {0}")]
    InvalidFields(FieldErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable lookup key.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("username", "too long");
        errors.add("username", "bad characters");
        errors.add("email", "required");

        assert_eq!(errors.get("username").map(<[String]>::len), Some(2));
        assert_eq!(
            errors.to_string(),
            "email: required; username: too long; username: bad characters"
        );
        assert_matches!(errors.into_result(), Err(CoreError::InvalidFields(_)));
    }

    #[test]
    fn field_errors_serialize_as_map() {
        let err = FieldErrors::single("score", "out of range");
        let CoreError::InvalidFields(fields) = err else {
            panic!("expected InvalidFields");
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({ "score": ["out of range"] }));
    }

    #[test]
    fn not_found_message_includes_key() {
        let err = CoreError::not_found("Title", 7);
        assert_eq!(err.to_string(), "Title '7' not found");
    }
}
