//! Owner notification routing.
//!
//! Each [`MailRule`] names a recipient and the answers that must be given for
//! the recipient to be notified. A condition's `value` is a comma-separated
//! list of acceptable answers; segments may be double-quoted to include a
//! comma:
//!
//! ```
//! use formpipe_forms::{MailRule, SubmissionData};
//! use formpipe_mail::routing::route;
//!
//! let rules = vec![MailRule::new("a@x.com").when("color", r#""red, bright", blue"#)];
//!
//! let mut data = SubmissionData::new();
//! data.insert("color".into(), "red, bright".into());
//! assert_eq!(route(&rules, &data), vec!["a@x.com"]);
//!
//! data.insert("color".into(), "green".into());
//! assert!(route(&rules, &data).is_empty());
//! ```
//!
//! Quotes cannot be escaped. An unbalanced quote groups nothing, and text
//! directly before a quote is not an acceptable answer on its own.

use serde_json::Value;

use formpipe_core::utils::{display_text, is_truthy, scalar_text, split_quoted_list};
use formpipe_forms::{FormDefinition, MailCondition, MailRule, SubmissionData};

use crate::mailer::{Mailer, EMAIL_SUBMISSION_TEMPLATE};

/// Returns the submitted answer as a list of strings.
///
/// Scalars become a one-element list; list entries that are not scalars are
/// dropped.
fn answer_values(answer: &Value) -> Vec<String> {
    match answer {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Returns whether one condition passes against `data`.
///
/// A condition without an acceptance list always passes. Otherwise the answer
/// must be present and truthy, and at least one of its values must appear in
/// the list.
pub fn condition_passes(condition: &MailCondition, data: &SubmissionData) -> bool {
    let Some(accepted) = condition.value.as_deref().filter(|v| !v.is_empty()) else {
        return true;
    };

    let Some(answer) = data.get(&condition.field).filter(|a| is_truthy(a)) else {
        return false;
    };

    let accepted = split_quoted_list(accepted);
    answer_values(answer)
        .iter()
        .any(|value| accepted.contains(value))
}

/// Returns whether every condition of the rule passes.
pub fn rule_passes(rule: &MailRule, data: &SubmissionData) -> bool {
    rule.conditions
        .iter()
        .all(|condition| condition_passes(condition, data))
}

/// Returns the recipients whose rules pass, in rule order, without
/// duplicates.
pub fn route(rules: &[MailRule], data: &SubmissionData) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    for rule in rules {
        if rule_passes(rule, data) && !recipients.contains(&rule.email) {
            recipients.push(rule.email.clone());
        }
    }
    recipients
}

/// Joins list answers with `", "` for display in emails.
pub fn flatten_lists(data: &SubmissionData) -> SubmissionData {
    data.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Array(items) => Value::String(
                    items
                        .iter()
                        .map(display_text)
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// What happened to an owner notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Notification is turned off, or the form has no rules.
    Disabled,
    /// Dry-run mode: the recipients that would have been notified.
    DryRun(Vec<String>),
    /// No rule passed.
    NoRecipients,
    /// The email was handed to the backend.
    Delivered(Vec<String>),
    /// The backend failed; the error was logged.
    Failed(Vec<String>),
}

impl Notification {
    /// Returns the routed recipients, if routing ran.
    pub fn recipients(&self) -> &[String] {
        match self {
            Self::DryRun(to) | Self::Delivered(to) | Self::Failed(to) => to,
            Self::Disabled | Self::NoRecipients => &[],
        }
    }
}

/// Notifies the form's owners of a submission.
///
/// Delivery failures are logged and reported as [`Notification::Failed`];
/// they never fail the submission.
pub async fn send_email_submissions(
    mailer: &Mailer,
    form: &FormDefinition,
    data: &SubmissionData,
) -> Notification {
    if !mailer.email_submissions || form.emails.is_empty() {
        return Notification::Disabled;
    }

    let recipients = route(&form.emails, data);

    if mailer.testing {
        return Notification::DryRun(recipients);
    }
    if recipients.is_empty() {
        return Notification::NoRecipients;
    }

    let data = flatten_lists(data);
    match mailer
        .send_template(EMAIL_SUBMISSION_TEMPLATE, form, &data, recipients.clone())
        .await
    {
        Ok(()) => Notification::Delivered(recipients),
        Err(err) => {
            tracing::error!(
                form_id = %form.id,
                error = %err,
                "submission email notification failed"
            );
            Notification::Failed(recipients)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> SubmissionData {
        value.as_object().cloned().unwrap()
    }

    fn color_rule() -> MailRule {
        MailRule::new("a@x.com").when("color", r#""red, bright", blue"#)
    }

    #[test]
    fn test_unquoted_segment_matches() {
        assert_eq!(route(&[color_rule()], &data(json!({"color": "blue"}))), vec!["a@x.com"]);
    }

    #[test]
    fn test_quoted_segment_with_comma_matches() {
        assert_eq!(
            route(&[color_rule()], &data(json!({"color": "red, bright"}))),
            vec!["a@x.com"]
        );
    }

    #[test]
    fn test_non_member_does_not_match() {
        assert!(route(&[color_rule()], &data(json!({"color": "green"}))).is_empty());
        assert!(route(&[color_rule()], &data(json!({"color": "red"}))).is_empty());
    }

    #[test]
    fn test_rule_without_conditions_always_matches() {
        assert_eq!(route(&[MailRule::new("all@x.com")], &SubmissionData::new()), vec!["all@x.com"]);
    }

    #[test]
    fn test_empty_condition_value_passes() {
        let rule = MailRule {
            email: "a@x.com".into(),
            conditions: vec![
                MailCondition {
                    field: "color".into(),
                    value: None,
                },
                MailCondition::new("size", ""),
            ],
        };
        assert!(rule_passes(&rule, &SubmissionData::new()));
    }

    #[test]
    fn test_missing_or_falsy_answer_fails() {
        let rule = MailRule::new("a@x.com").when("color", "blue");
        assert!(!rule_passes(&rule, &SubmissionData::new()));
        assert!(!rule_passes(&rule, &data(json!({"color": ""}))));
        assert!(!rule_passes(&rule, &data(json!({"color": null}))));
    }

    #[test]
    fn test_all_conditions_must_pass() {
        let rule = MailRule::new("a@x.com")
            .when("color", "blue")
            .when("size", "large");
        assert!(rule_passes(&rule, &data(json!({"color": "blue", "size": "large"}))));
        assert!(!rule_passes(&rule, &data(json!({"color": "blue", "size": "small"}))));
    }

    #[test]
    fn test_list_answers_intersect() {
        let rule = MailRule::new("a@x.com").when("toppings", "olives, basil");
        assert!(rule_passes(&rule, &data(json!({"toppings": ["cheese", "basil"]}))));
        assert!(!rule_passes(&rule, &data(json!({"toppings": ["cheese"]}))));
        assert!(!rule_passes(&rule, &data(json!({"toppings": []}))));
    }

    #[test]
    fn test_scalar_answers_compare_as_text() {
        let rule = MailRule::new("a@x.com").when("count", "3, 4");
        assert!(rule_passes(&rule, &data(json!({"count": 3}))));
        let rule = MailRule::new("a@x.com").when("agree", "true");
        assert!(rule_passes(&rule, &data(json!({"agree": true}))));
        assert!(!rule_passes(&rule, &data(json!({"agree": false}))));
    }

    #[test]
    fn test_recipients_deduplicated_in_first_seen_order() {
        let rules = vec![
            MailRule::new("b@x.com"),
            MailRule::new("a@x.com").when("color", "blue"),
            MailRule::new("b@x.com").when("color", "blue"),
            MailRule::new("c@x.com").when("color", "red"),
        ];
        assert_eq!(
            route(&rules, &data(json!({"color": "blue"}))),
            vec!["b@x.com", "a@x.com"]
        );
    }

    #[test]
    fn test_flatten_lists() {
        let flat = flatten_lists(&data(json!({"toppings": ["a", "b"], "name": "Ada", "n": 1})));
        assert_eq!(flat["toppings"], "a, b");
        assert_eq!(flat["name"], "Ada");
        assert_eq!(flat["n"], 1);
    }

    #[test]
    fn test_notification_recipients() {
        assert!(Notification::Disabled.recipients().is_empty());
        assert_eq!(
            Notification::DryRun(vec!["a@x.com".into()]).recipients(),
            &["a@x.com".to_string()]
        );
    }
}
