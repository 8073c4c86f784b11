//! Core error types for the formpipe pipeline.
//!
//! This module provides [`FormError`], the error enum shared by every crate in
//! the workspace, and [`FieldError`], the user-facing error attached to a
//! single field (or to the whole form). A rejected submission carries its
//! field errors inside [`InvalidSubmission`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A recoverable, user-facing validation failure.
///
/// A field error either names the field the submitter must fix, or is flagged
/// `global` when it concerns the form as a whole (for example a failed bot
/// challenge).
///
/// # Examples
///
/// ```
/// use formpipe_core::error::FieldError;
///
/// let err = FieldError::field("email", "Enter a valid email address.");
/// assert_eq!(err.field.as_deref(), Some("email"));
/// assert!(!err.global);
///
/// let err = FieldError::global("The challenge could not be verified.");
/// assert!(err.global);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The field the error is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Whether the error applies to the whole form.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub global: bool,
    /// The human-readable message (or message key).
    pub message: String,
}

impl FieldError {
    /// Creates an error attached to the named field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            global: false,
            message: message.into(),
        }
    }

    /// Creates a form-wide error.
    pub fn global(message: impl Into<String>) -> Self {
        Self {
            field: None,
            global: true,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for FieldError {}

/// The aggregate rejection of a submission.
///
/// Holds every field error collected while processing the submission, in the
/// order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidSubmission {
    /// The collected errors.
    #[serde(rename = "formErrors")]
    pub form_errors: Vec<FieldError>,
}

impl InvalidSubmission {
    /// Creates an aggregate error from a list of field errors.
    pub const fn new(form_errors: Vec<FieldError>) -> Self {
        Self { form_errors }
    }
}

impl fmt::Display for InvalidSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid submission")?;
        for (i, error) in self.form_errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

/// The primary error type for formpipe.
///
/// Each variant maps to an HTTP status code via [`FormError::status_code`].
#[derive(Error, Debug)]
pub enum FormError {
    // ── Boundary errors ──────────────────────────────────────────────

    /// The requested form does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The submission was rejected. Carries every field error.
    #[error("{0}")]
    Invalid(InvalidSubmission),

    /// The request itself was malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    // ── Processing errors ────────────────────────────────────────────

    /// A sanitizer failed in a way that is not attributable to user input.
    #[error("Systemic error: {0}")]
    Systemic(String),

    /// An email could not be delivered.
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// The submission store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormError {
    /// Creates an `Invalid` error from a list of field errors.
    pub const fn invalid(form_errors: Vec<FieldError>) -> Self {
        Self::Invalid(InvalidSubmission::new(form_errors))
    }

    /// Returns the HTTP status code associated with this error.
    ///
    /// - `Invalid`, `BadRequest` -> 400
    /// - `NotFound` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Invalid(_) | Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Systemic(_)
            | Self::Delivery(_)
            | Self::Storage(_)
            | Self::ConfigurationError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns the short machine-readable name of this error.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "notfound",
            Self::Invalid(_) | Self::BadRequest(_) => "invalid",
            Self::Systemic(_)
            | Self::Delivery(_)
            | Self::Storage(_)
            | Self::ConfigurationError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => "error",
        }
    }

    /// Returns the field errors carried by an `Invalid` error.
    pub fn form_errors(&self) -> &[FieldError] {
        match self {
            Self::Invalid(invalid) => &invalid.form_errors,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, FormError>`.
pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::field("name", "This field is required.");
        assert_eq!(err.to_string(), "name: This field is required.");
        let err = FieldError::global("Try again.");
        assert_eq!(err.to_string(), "Try again.");
    }

    #[test]
    fn test_field_error_serialization() {
        let err = FieldError::field("name", "required");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"field": "name", "message": "required"}));

        let err = FieldError::global("challenge");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"global": true, "message": "challenge"}));
    }

    #[test]
    fn test_invalid_submission_display() {
        let invalid = InvalidSubmission::new(vec![
            FieldError::field("a", "required"),
            FieldError::field("b", "invalid"),
        ]);
        assert_eq!(invalid.to_string(), "invalid submission: a: required; b: invalid");
        assert_eq!(InvalidSubmission::default().to_string(), "invalid submission");
    }

    #[test]
    fn test_form_error_status_codes() {
        assert_eq!(FormError::NotFound("x".into()).status_code(), 404);
        assert_eq!(FormError::invalid(vec![]).status_code(), 400);
        assert_eq!(FormError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(FormError::Systemic("x".into()).status_code(), 500);
        assert_eq!(FormError::Delivery("x".into()).status_code(), 500);
        assert_eq!(FormError::Storage("x".into()).status_code(), 500);
        assert_eq!(FormError::ConfigurationError("x".into()).status_code(), 500);
    }

    #[test]
    fn test_form_error_names() {
        assert_eq!(FormError::NotFound("x".into()).name(), "notfound");
        assert_eq!(FormError::invalid(vec![]).name(), "invalid");
        assert_eq!(FormError::Systemic("x".into()).name(), "error");
    }

    #[test]
    fn test_form_errors_accessor() {
        let err = FormError::invalid(vec![FieldError::field("a", "required")]);
        assert_eq!(err.form_errors().len(), 1);
        assert!(FormError::NotFound("x".into()).form_errors().is_empty());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FormError = json_err.into();
        assert!(matches!(err, FormError::SerializationError(_)));
    }
}
