//! The field-type registry.
//!
//! Each field widget names a type tag (`text`, `select`, ...). The
//! [`FieldRegistry`] maps tags to [`FieldType`] implementations, which know how
//! to check a field's required constraint and how to sanitize its raw value.
//! Widgets whose tag has no registered type are not sanitized and produce no
//! output.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use formpipe_core::{FieldError, FormError};

use crate::fields;
use crate::form::SubmissionData;
use crate::widgets::FieldWidget;

/// Message used for required fields that were not supplied.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// A failure raised while sanitizing one field.
#[derive(Debug)]
pub enum SanitizeError {
    /// The submitted value is unacceptable; reported back to the submitter.
    Field(FieldError),
    /// Something went wrong that is not the submitter's fault; aborts the
    /// whole submission.
    Systemic(FormError),
}

impl From<FieldError> for SanitizeError {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

impl From<FormError> for SanitizeError {
    fn from(err: FormError) -> Self {
        Self::Systemic(err)
    }
}

/// Returns whether a raw value counts as not supplied.
///
/// Absent keys, `null`, `false`, blank strings and empty lists are missing.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Number(_) | Value::Bool(true) | Value::Object(_)) => false,
    }
}

/// The behaviour of one field type.
///
/// Implementations must be `Send + Sync`; a single registry is shared by all
/// concurrent submissions.
#[async_trait]
pub trait FieldType: Send + Sync {
    /// Returns the type tag this implementation handles by default.
    fn name(&self) -> &str;

    /// Checks that a required field was supplied.
    ///
    /// The default implementation rejects required fields whose raw value is
    /// [missing](is_missing).
    fn check_required(&self, widget: &FieldWidget, input: &SubmissionData) -> Result<(), FieldError> {
        if widget.required && is_missing(input.get(&widget.field_name)) {
            return Err(FieldError::field(&widget.field_name, REQUIRED_MESSAGE));
        }
        Ok(())
    }

    /// Sanitizes the raw value of `widget` from `input` into `output`.
    async fn sanitize(
        &self,
        widget: &FieldWidget,
        input: &SubmissionData,
        output: &mut SubmissionData,
    ) -> Result<(), SanitizeError>;
}

/// A registry of field types keyed by type tag.
#[derive(Clone, Default)]
pub struct FieldRegistry {
    types: HashMap<String, Arc<dyn FieldType>>,
}

impl FieldRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in field types.
    ///
    /// See [`fields`](crate::fields) for the catalog.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        fields::register_builtin_types(&mut registry);
        registry
    }

    /// Registers a field type under its own name.
    pub fn register(&mut self, field_type: Arc<dyn FieldType>) {
        let tag = field_type.name().to_string();
        self.register_as(tag, field_type);
    }

    /// Registers a field type under an explicit tag, replacing any previous
    /// registration.
    pub fn register_as(&mut self, tag: impl Into<String>, field_type: Arc<dyn FieldType>) {
        self.types.insert(tag.into(), field_type);
    }

    /// Looks up the field type for a tag.
    pub fn get(&self, tag: &str) -> Option<&Arc<dyn FieldType>> {
        self.types.get(tag)
    }

    /// Returns `true` if a type is registered for the tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Returns the registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.types.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
