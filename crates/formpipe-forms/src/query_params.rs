//! Capture of whitelisted query-string parameters.
//!
//! Forms can record marketing parameters (`utm_source`, ...) that were present
//! on the page the form was submitted from. Clients send them under the
//! `queryParams` key of the submission; only parameters listed in the form's
//! `queryParamList` are kept.

use serde_json::Value;

use formpipe_core::utils::{clamp_chars, is_truthy, launder_string, strip_tags};

use crate::form::{FormDefinition, QueryParamSpec, SubmissionData};

/// The submission key holding the query-string parameters.
pub const QUERY_PARAMS_KEY: &str = "queryParams";

/// Returns the cleaned value of one whitelisted parameter.
///
/// Query params arrive from the page URL rather than a form control, so
/// markup tags are removed before clamping.
fn tidy_param_value(spec: &QueryParamSpec, value: &Value) -> String {
    let value = strip_tags(&launder_string(value)).trim().to_string();
    match spec.length_limit {
        Some(limit) if limit > 0 => {
            clamp_chars(&value, usize::try_from(limit).unwrap_or(usize::MAX))
        }
        _ => value,
    }
}

/// Merges whitelisted query params from `input` into `output`.
///
/// Does nothing unless the form enables query params and lists at least one.
/// When the submission has no `queryParams` mapping, `output.queryParams` is
/// set to `null` and nothing else changes. Otherwise each listed key that is
/// not one of `known_fields` is written: the cleaned value when supplied and
/// truthy, `null` when not.
pub fn merge_query_params(
    form: &FormDefinition,
    input: &SubmissionData,
    output: &mut SubmissionData,
    known_fields: &[String],
) {
    if !form.enable_query_params || form.query_param_list.is_empty() {
        return;
    }

    let params = match input.get(QUERY_PARAMS_KEY) {
        Some(Value::Object(params)) => params,
        _ => {
            output.insert(QUERY_PARAMS_KEY.to_string(), Value::Null);
            return;
        }
    };

    for spec in &form.query_param_list {
        // Real fields capture their own value client-side.
        if known_fields.iter().any(|name| *name == spec.key) {
            continue;
        }

        let value = match params.get(&spec.key) {
            Some(value) if is_truthy(value) => Value::String(tidy_param_value(spec, value)),
            _ => Value::Null,
        };
        output.insert(spec.key.clone(), value);
    }
}
