//! Built-in field types.
//!
//! | Tag | Output |
//! |---|---|
//! | `text`, `textarea` | laundered string, optional `maxLength` |
//! | `email` | laundered string that must look like an address when non-empty |
//! | `select`, `radio` | one of the widget's `choices` |
//! | `checkboxes` | list of the widget's `choices` |
//! | `boolean` | `true` / `false` |
//!
//! Choices are read from the widget's `choices` option, either as plain strings
//! or as `{"value": ..., "label": ...}` objects.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use formpipe_core::utils::{is_email_address, launder_string};
use formpipe_core::FieldError;

use crate::form::SubmissionData;
use crate::registry::{FieldRegistry, FieldType, SanitizeError};
use crate::widgets::FieldWidget;

/// Registers every built-in field type.
pub fn register_builtin_types(registry: &mut FieldRegistry) {
    registry.register(Arc::new(TextField::new("text")));
    registry.register(Arc::new(TextField::new("textarea")));
    registry.register(Arc::new(EmailField));
    registry.register(Arc::new(ChoiceField::new("select")));
    registry.register(Arc::new(ChoiceField::new("radio")));
    registry.register(Arc::new(CheckboxesField));
    registry.register(Arc::new(BooleanField));
}

/// Returns the acceptable values listed in a widget's `choices` option.
pub fn choice_values(widget: &FieldWidget) -> Vec<String> {
    let Some(Value::Array(choices)) = widget.option("choices") else {
        return Vec::new();
    };
    choices
        .iter()
        .filter_map(|choice| match choice {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj.get("value").map(launder_string),
            _ => None,
        })
        .collect()
}

fn invalid_choice(widget: &FieldWidget, value: &str) -> FieldError {
    FieldError::field(
        &widget.field_name,
        format!("Select a valid choice. {value} is not one of the available choices."),
    )
}

/// Single- or multi-line free text.
#[derive(Debug, Clone)]
pub struct TextField {
    tag: String,
}

impl TextField {
    /// Creates a text field type registered under `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

#[async_trait]
impl FieldType for TextField {
    fn name(&self) -> &str {
        &self.tag
    }

    async fn sanitize(
        &self,
        widget: &FieldWidget,
        input: &SubmissionData,
        output: &mut SubmissionData,
    ) -> Result<(), SanitizeError> {
        let value = input
            .get(&widget.field_name)
            .map(launder_string)
            .unwrap_or_default();

        if let Some(max) = widget.option("maxLength").and_then(Value::as_u64) {
            let count = value.chars().count() as u64;
            if count > max {
                return Err(FieldError::field(
                    &widget.field_name,
                    format!("Ensure this value has at most {max} characters (it has {count})."),
                )
                .into());
            }
        }

        output.insert(widget.field_name.clone(), Value::String(value));
        Ok(())
    }
}

/// An email address.
#[derive(Debug, Clone, Copy)]
pub struct EmailField;

#[async_trait]
impl FieldType for EmailField {
    fn name(&self) -> &str {
        "email"
    }

    async fn sanitize(
        &self,
        widget: &FieldWidget,
        input: &SubmissionData,
        output: &mut SubmissionData,
    ) -> Result<(), SanitizeError> {
        let value = input
            .get(&widget.field_name)
            .map(launder_string)
            .unwrap_or_default();

        if !value.is_empty() && !is_email_address(&value) {
            return Err(
                FieldError::field(&widget.field_name, "Enter a valid email address.").into(),
            );
        }

        output.insert(widget.field_name.clone(), Value::String(value));
        Ok(())
    }
}

/// A single choice from a fixed list (select menus and radio buttons).
#[derive(Debug, Clone)]
pub struct ChoiceField {
    tag: String,
}

impl ChoiceField {
    /// Creates a choice field type registered under `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

#[async_trait]
impl FieldType for ChoiceField {
    fn name(&self) -> &str {
        &self.tag
    }

    async fn sanitize(
        &self,
        widget: &FieldWidget,
        input: &SubmissionData,
        output: &mut SubmissionData,
    ) -> Result<(), SanitizeError> {
        let value = input
            .get(&widget.field_name)
            .map(launder_string)
            .unwrap_or_default();

        if !value.is_empty() && !choice_values(widget).contains(&value) {
            return Err(invalid_choice(widget, &value).into());
        }

        output.insert(widget.field_name.clone(), Value::String(value));
        Ok(())
    }
}

/// Any number of choices from a fixed list.
#[derive(Debug, Clone, Copy)]
pub struct CheckboxesField;

#[async_trait]
impl FieldType for CheckboxesField {
    fn name(&self) -> &str {
        "checkboxes"
    }

    async fn sanitize(
        &self,
        widget: &FieldWidget,
        input: &SubmissionData,
        output: &mut SubmissionData,
    ) -> Result<(), SanitizeError> {
        let raw: Vec<&Value> = match input.get(&widget.field_name) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().collect(),
            Some(scalar) => vec![scalar],
        };

        let choices = choice_values(widget);
        let mut selected = Vec::with_capacity(raw.len());
        for item in raw {
            let value = launder_string(item);
            if value.is_empty() {
                continue;
            }
            if !choices.contains(&value) {
                return Err(invalid_choice(widget, &value).into());
            }
            if !selected.contains(&value) {
                selected.push(value);
            }
        }

        output.insert(
            widget.field_name.clone(),
            Value::Array(selected.into_iter().map(Value::String).collect()),
        );
        Ok(())
    }
}

/// A single checkbox.
///
/// Browsers submit a checked box as `"on"`; JSON clients send `true`.
#[derive(Debug, Clone, Copy)]
pub struct BooleanField;

#[async_trait]
impl FieldType for BooleanField {
    fn name(&self) -> &str {
        "boolean"
    }

    async fn sanitize(
        &self,
        widget: &FieldWidget,
        input: &SubmissionData,
        output: &mut SubmissionData,
    ) -> Result<(), SanitizeError> {
        let checked = match input.get(&widget.field_name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => {
                matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
            }
            _ => false,
        };
        output.insert(widget.field_name.clone(), Value::Bool(checked));
        Ok(())
    }
}
