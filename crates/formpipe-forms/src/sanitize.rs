//! The sanitization pipeline.
//!
//! [`sanitize`] walks the widget tree in document order and runs each field's
//! registered type over the raw input. Field errors accumulate across all
//! fields so the submitter sees every problem at once; a systemic error aborts
//! immediately.
//!
//! [`clean_submission`] is the whole pipeline for one submission: conditional
//! resolution, sanitization, aggregation of errors, then the query-param merge.

use formpipe_core::{FieldError, FormError, FormResult};

use crate::conditionals::{build_conditionals, resolve_skip_set, SkipSet};
use crate::form::{FormDefinition, SubmissionData};
use crate::query_params::merge_query_params;
use crate::registry::{FieldRegistry, SanitizeError};
use crate::widgets::Area;

/// The result of sanitizing a submission.
#[derive(Debug, Clone, Default)]
pub struct Sanitized {
    /// Sanitized values keyed by field name, in traversal order.
    pub output: SubmissionData,
    /// Field errors, in traversal order.
    pub errors: Vec<FieldError>,
}

impl Sanitized {
    /// Returns `true` if no field errors were collected.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into the sanitized output, or an aggregate
    /// [`FormError::Invalid`] carrying every collected error.
    pub fn into_result(self) -> FormResult<SubmissionData> {
        if self.errors.is_empty() {
            Ok(self.output)
        } else {
            Err(FormError::invalid(self.errors))
        }
    }
}

/// Sanitizes `input` against every field in `root` not in `skip`.
///
/// For each field whose type is registered, the required check runs first;
/// a missing required value records an error and the field is not sanitized.
/// Fields with unregistered types produce neither output nor errors.
///
/// # Errors
///
/// Returns the systemic error of the first field type that raises one.
pub async fn sanitize(
    root: &Area,
    registry: &FieldRegistry,
    input: &SubmissionData,
    skip: &SkipSet,
) -> FormResult<Sanitized> {
    let mut result = Sanitized::default();

    for widget in root.field_widgets() {
        if skip.contains(&widget.field_name) {
            continue;
        }
        let Some(field_type) = registry.get(&widget.widget_type) else {
            continue;
        };

        if let Err(err) = field_type.check_required(widget, input) {
            result.errors.push(err);
            continue;
        }

        match field_type.sanitize(widget, input, &mut result.output).await {
            Ok(()) => {}
            Err(SanitizeError::Field(err)) => result.errors.push(err),
            Err(SanitizeError::Systemic(err)) => {
                tracing::error!(
                    field = %widget.field_name,
                    widget_type = %widget.widget_type,
                    error = %err,
                    "field sanitizer failed"
                );
                return Err(err);
            }
        }
    }

    Ok(result)
}

/// Runs the full pipeline for one submission.
///
/// `prior_errors` are errors gathered before sanitization (for example by the
/// bot challenge); they are reported ahead of field errors.
///
/// # Errors
///
/// Returns [`FormError::Invalid`] if any error was collected, or the first
/// systemic error raised by a field type.
pub async fn clean_submission(
    form: &FormDefinition,
    registry: &FieldRegistry,
    input: &SubmissionData,
    prior_errors: Vec<FieldError>,
) -> FormResult<SubmissionData> {
    let conditionals = build_conditionals(&form.contents);
    let skip = resolve_skip_set(&conditionals, input);
    if !skip.is_empty() {
        tracing::debug!(form_id = %form.id, skipped = skip.len(), "inactive conditional fields");
    }

    let sanitized = sanitize(&form.contents, registry, input, &skip).await?;

    let mut errors = prior_errors;
    errors.extend(sanitized.errors);
    let mut output = Sanitized {
        output: sanitized.output,
        errors,
    }
    .into_result()?;

    merge_query_params(form, input, &mut output, &form.field_names());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldType;
    use crate::widgets::{FieldWidget, Widget};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct Exploding;

    #[async_trait]
    impl FieldType for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        async fn sanitize(
            &self,
            _widget: &FieldWidget,
            _input: &SubmissionData,
            _output: &mut SubmissionData,
        ) -> Result<(), SanitizeError> {
            Err(FormError::Systemic("upstream lookup failed".into()).into())
        }
    }

    fn input(value: Value) -> SubmissionData {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_sanitize_in_document_order() {
        let root = Area::new(vec![
            Widget::field("text", "first"),
            Widget::conditional("first", "x", vec![Widget::field("text", "nested")]),
            Widget::field("text", "last"),
        ]);
        let registry = FieldRegistry::with_builtin_types();
        let result = sanitize(
            &root,
            &registry,
            &input(json!({"nested": "n", "last": "l", "first": "x"})),
            &SkipSet::new(),
        )
        .await
        .unwrap();
        let keys: Vec<&str> = result.output.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["first", "last", "nested"]);
    }

    #[tokio::test]
    async fn test_skipped_fields_are_absent() {
        let root = Area::new(vec![
            Widget::field("text", "a"),
            Widget::required_field("text", "b"),
        ]);
        let registry = FieldRegistry::with_builtin_types();
        let skip: SkipSet = ["b"].into_iter().collect();
        let result = sanitize(&root, &registry, &input(json!({"a": "1", "b": "2"})), &skip)
            .await
            .unwrap();
        assert!(result.is_valid());
        assert!(!result.output.contains_key("b"));
    }

    #[tokio::test]
    async fn test_unregistered_types_are_ignored() {
        let root = Area::new(vec![Widget::field("signature", "sig")]);
        let registry = FieldRegistry::with_builtin_types();
        let result = sanitize(&root, &registry, &input(json!({"sig": "x"})), &SkipSet::new())
            .await
            .unwrap();
        assert!(result.output.is_empty());
        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn test_errors_accumulate_in_order() {
        let root = Area::new(vec![
            Widget::required_field("text", "name"),
            Widget::field("email", "email"),
            Widget::field("text", "note"),
        ]);
        let registry = FieldRegistry::with_builtin_types();
        let result = sanitize(
            &root,
            &registry,
            &input(json!({"email": "bad", "note": "ok"})),
            &SkipSet::new(),
        )
        .await
        .unwrap();
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_deref()).collect();
        assert_eq!(fields, vec![Some("name"), Some("email")]);
        assert_eq!(result.output["note"], "ok");
        assert!(!result.output.contains_key("name"));
    }

    #[tokio::test]
    async fn test_systemic_error_aborts() {
        let root = Area::new(vec![
            Widget::required_field("text", "name"),
            Widget::field("exploding", "boom"),
        ]);
        let mut registry = FieldRegistry::with_builtin_types();
        registry.register(Arc::new(Exploding));
        let err = sanitize(&root, &registry, &input(json!({})), &SkipSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::Systemic(_)));
    }

    #[tokio::test]
    async fn test_clean_submission_reports_prior_errors_first() {
        let form = FormDefinition::new(
            "f",
            Area::new(vec![Widget::required_field("text", "name")]),
        );
        let registry = FieldRegistry::with_builtin_types();
        let err = clean_submission(
            &form,
            &registry,
            &input(json!({})),
            vec![FieldError::global("challenge failed")],
        )
        .await
        .unwrap_err();
        let errors = err.form_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].global);
        assert_eq!(errors[1].field.as_deref(), Some("name"));
    }

    #[tokio::test]
    async fn test_clean_submission_prior_errors_alone_reject() {
        let form = FormDefinition::new("f", Area::new(vec![Widget::field("text", "name")]));
        let registry = FieldRegistry::with_builtin_types();
        let err = clean_submission(
            &form,
            &registry,
            &input(json!({"name": "Ada"})),
            vec![FieldError::global("challenge failed")],
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
