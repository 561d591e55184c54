//! Declarative request validation.
//!
//! Every operation runs an explicit validation step before any matching
//! logic: required fields, string lengths, enum membership, numeric
//! ranges, referential existence. The result is either success or a list
//! of field errors; there is no ambient validator object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed constraint, named by the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The only failure kind in this service. Maps to HTTP 422.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("validation failed: {} field error(s)", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &str, message: &str) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }],
        }
    }
}

/// Accumulates field errors across the checks of one request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// String length cap (counted in characters, matching the original
    /// validator's semantics).
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.fail(field, &format!("must not exceed {} characters", max));
        }
    }

    pub fn required(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.fail(field, "is required");
        }
    }

    /// Inclusive integer range check.
    pub fn in_range(&mut self, field: &str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.fail(field, &format!("must be between {} and {}", min, max));
        }
    }

    /// Referential existence, with the lookup already performed by the
    /// caller (the validator stays storage-free).
    pub fn exists(&mut self, field: &str, found: bool) {
        if !found {
            self.fail(field, "does not reference an existing record");
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_validator_passes() {
        assert!(Validator::new().finish().is_ok());
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        let mut v = Validator::new();
        // 500 multibyte characters must still pass a 500-char cap.
        let s = "é".repeat(500);
        v.max_len("symptoms", &s, 500);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        let s = "é".repeat(501);
        v.max_len("symptoms", &s, 500);
        let err = v.finish().unwrap_err();
        assert_eq!(err.errors[0].field, "symptoms");
    }

    #[test]
    fn collects_multiple_field_errors() {
        let mut v = Validator::new();
        v.required("message", "");
        v.in_range("year", 1999, 2000, 2026);
        v.exists("commodity_id", false);
        let err = v.finish().unwrap_err();
        assert_eq!(err.errors.len(), 3);
        let fields: Vec<_> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["message", "year", "commodity_id"]);
    }

    #[test]
    fn range_is_inclusive() {
        let mut v = Validator::new();
        v.in_range("year", 2000, 2000, 2026);
        v.in_range("year", 2026, 2000, 2026);
        assert!(v.finish().is_ok());
    }
}
