//! Validation errors for structural fingerprints.
//!
//! Validation never stops at the first problem: every offending field is
//! collected into a [`ValidationError`] so transport layers can report the
//! complete list back to the caller in one round trip.
//!
//! # Example
//!
//! ```rust
//! use features::{FieldError, ValidationError};
//!
//! let err = ValidationError::from(vec![
//!     FieldError::new("width", "must be a positive number"),
//!     FieldError::new("opacity", "must be between 0 and 1"),
//! ]);
//! assert_eq!(err.len(), 2);
//! assert!(err.to_string().contains("width"));
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `structure.width`.
    pub field: String,
    /// Human readable reason.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Schema validation failure enumerating every offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("validation failed: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Shorthand for a failure on exactly one field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Prefix every field path with `prefix.`, used when a structure is
    /// validated as part of a larger request.
    pub fn nested(mut self, prefix: &str) -> Self {
        for err in &mut self.errors {
            err.field = format!("{prefix}.{}", err.field);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn a list of collected failures into a result.
    pub fn check(errors: Vec<FieldError>) -> Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }
}

impl From<Vec<FieldError>> for ValidationError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}
