//! Form definitions.
//!
//! A [`FormDefinition`] identifies a form, holds its widget tree, and carries
//! the configuration for query-param capture, the bot challenge, owner
//! notification rules ([`MailRule`]), and the submitter confirmation email.
//! Definitions deserialize from the stored camelCase JSON shape and are
//! immutable while a submission is processed.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::widgets::Area;

/// Submitted or sanitized values, keyed by field name in insertion order.
pub type SubmissionData = Map<String, Value>;

/// A whitelisted query-string parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParamSpec {
    /// The parameter name, also used as the output key.
    pub key: String,
    /// Maximum number of characters kept; zero or absent keeps everything.
    #[serde(default)]
    pub length_limit: Option<i64>,
}

impl QueryParamSpec {
    /// Creates an unlimited parameter spec.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            length_limit: None,
        }
    }

    /// Sets the length limit.
    #[must_use]
    pub const fn with_length_limit(mut self, limit: i64) -> Self {
        self.length_limit = Some(limit);
        self
    }
}

/// One condition of a [`MailRule`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MailCondition {
    /// The field whose answer is checked.
    pub field: String,
    /// Comma-separated acceptable answers; segments may be double-quoted.
    #[serde(default)]
    pub value: Option<String>,
}

impl MailCondition {
    /// Creates a condition.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: Some(value.into()),
        }
    }
}

/// A notification recipient and the conditions under which it is notified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MailRule {
    /// The recipient address.
    pub email: String,
    /// Conditions that must all pass. Empty means always notify.
    #[serde(default)]
    pub conditions: Vec<MailCondition>,
}

impl MailRule {
    /// Creates an unconditional rule.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            conditions: Vec::new(),
        }
    }

    /// Adds a condition.
    #[must_use]
    pub fn when(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push(MailCondition::new(field, value));
        self
    }
}

/// A complete form definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    /// The form's identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// The form title, used as the notification subject.
    #[serde(default)]
    pub title: String,
    /// The sender address for notification emails.
    #[serde(default)]
    pub email: Option<String>,
    /// The root area of the widget tree.
    #[serde(default)]
    pub contents: Area,
    /// Whether whitelisted query params are captured.
    #[serde(default)]
    pub enable_query_params: bool,
    /// The whitelisted query params.
    #[serde(default)]
    pub query_param_list: Vec<QueryParamSpec>,
    /// Whether submissions must pass the bot challenge.
    #[serde(default)]
    pub enable_recaptcha: bool,
    /// Owner notification rules.
    #[serde(default)]
    pub emails: Vec<MailRule>,
    /// Whether the submitter receives a confirmation email.
    #[serde(default)]
    pub send_confirmation_email: bool,
    /// The field holding the submitter's address.
    #[serde(default)]
    pub email_confirmation_field: Option<String>,
}

impl FormDefinition {
    /// Creates an empty form with the given id and widget tree.
    pub fn new(id: impl Into<String>, contents: Area) -> Self {
        Self {
            id: id.into(),
            contents,
            ..Self::default()
        }
    }

    /// Returns the names of every field in the form, including fields inside
    /// conditional containers.
    pub fn field_names(&self) -> Vec<String> {
        self.contents
            .field_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Returns the part of the definition exposed to email templates.
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "_id": self.id,
            "title": self.title,
            "email": self.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_definition_from_json() {
        let form: FormDefinition = serde_json::from_value(json!({
            "_id": "contact",
            "title": "Contact us",
            "email": "forms@example.com",
            "contents": {"items": [
                {"type": "text", "fieldName": "name", "required": true}
            ]},
            "enableQueryParams": true,
            "queryParamList": [{"key": "utm_source", "lengthLimit": 20}],
            "emails": [
                {"email": "sales@example.com", "conditions": [{"field": "topic", "value": "sales"}]},
                {"email": "all@example.com"}
            ],
            "sendConfirmationEmail": true,
            "emailConfirmationField": "email"
        }))
        .unwrap();

        assert_eq!(form.id, "contact");
        assert_eq!(form.field_names(), vec!["name"]);
        assert_eq!(form.query_param_list[0].length_limit, Some(20));
        assert_eq!(form.emails.len(), 2);
        assert!(form.emails[1].conditions.is_empty());
        assert_eq!(form.email_confirmation_field.as_deref(), Some("email"));
        assert!(!form.enable_recaptcha);
    }

    #[test]
    fn test_form_definition_defaults() {
        let form: FormDefinition = serde_json::from_value(json!({"id": "bare"})).unwrap();
        assert_eq!(form.id, "bare");
        assert!(form.contents.is_empty());
        assert!(!form.enable_query_params);
        assert!(form.emails.is_empty());
    }

    #[test]
    fn test_mail_rule_builder() {
        let rule = MailRule::new("a@x.com").when("color", "red, blue");
        assert_eq!(rule.conditions.len(), 1);
        assert_eq!(rule.conditions[0].value.as_deref(), Some("red, blue"));
    }

    #[test]
    fn test_summary() {
        let mut form = FormDefinition::new("f1", Area::default());
        form.title = "Feedback".into();
        let summary = form.summary();
        assert_eq!(summary["_id"], "f1");
        assert_eq!(summary["title"], "Feedback");
    }
}
