//! Views over submitted JSON values.

use serde_json::Value;

/// Returns whether a submitted value counts as "provided".
///
/// `null`, `false`, `0`, `NaN`-like numbers and the empty string are falsy.
/// Every array and object is truthy, even when empty.
///
/// # Examples
///
/// ```
/// use formpipe_core::utils::value::is_truthy;
/// use serde_json::json;
///
/// assert!(is_truthy(&json!("x")));
/// assert!(is_truthy(&json!([])));
/// assert!(!is_truthy(&json!("")));
/// assert!(!is_truthy(&json!(0)));
/// assert!(!is_truthy(&json!(null)));
/// ```
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns the text form of a scalar value, used for string comparisons.
///
/// Strings are returned as-is, numbers and booleans in their JSON form.
/// `null`, arrays and objects have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Returns the text a value shows in rendered output.
///
/// Scalars use [`scalar_text`], `null` renders empty, and arrays or objects
/// fall back to compact JSON.
///
/// # Examples
///
/// ```
/// use formpipe_core::utils::value::display_text;
/// use serde_json::json;
///
/// assert_eq!(display_text(&json!("Ada")), "Ada");
/// assert_eq!(display_text(&json!(null)), "");
/// assert_eq!(display_text(&json!({"k": 1})), r#"{"k":1}"#);
/// ```
pub fn display_text(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| match value {
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(-0.5)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("blue")), Some("blue".to_string()));
        assert_eq!(scalar_text(&json!(7)), Some("7".to_string()));
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&json!(null)), None);
        assert_eq!(scalar_text(&json!(["a"])), None);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(&json!("a < b")), "a < b");
        assert_eq!(display_text(&json!(2.5)), "2.5");
        assert_eq!(display_text(&json!(false)), "false");
        assert_eq!(display_text(&json!(null)), "");
        assert_eq!(display_text(&json!(["a", 1])), r#"["a",1]"#);
    }
}
