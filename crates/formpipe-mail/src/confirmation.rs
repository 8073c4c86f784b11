//! Submitter confirmation emails.

use serde_json::Value;

use formpipe_core::utils::is_email_address;
use formpipe_forms::{FormDefinition, SubmissionData};

use crate::mailer::{Mailer, EMAIL_CONFIRMATION_TEMPLATE};

/// Notification key shown to the submitter when their address is malformed.
pub const ERROR_EMAIL_CONFIRM: &str = "errorEmailConfirm";

/// What happened to a confirmation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The form does not send confirmations.
    Disabled,
    /// The address field was left empty.
    NoAddress,
    /// The address field holds something that is not an email address.
    InvalidAddress {
        /// The form's address field.
        field: String,
    },
    /// The email was handed to the backend.
    Sent(String),
    /// The backend failed; the error was logged.
    Failed(String),
}

/// Sends the confirmation email to the submitter.
///
/// Runs only when the form enables confirmations and names its address field.
/// A malformed address is reported as [`Confirmation::InvalidAddress`] so the
/// caller can warn the submitter. Delivery failures are logged.
pub async fn send_confirmation(
    mailer: &Mailer,
    form: &FormDefinition,
    data: &SubmissionData,
) -> Confirmation {
    let Some(field) = form
        .email_confirmation_field
        .as_deref()
        .filter(|field| form.send_confirmation_email && !field.is_empty())
    else {
        return Confirmation::Disabled;
    };

    let address = match data.get(field) {
        None | Some(Value::Null) => return Confirmation::NoAddress,
        Some(Value::String(s)) if s.is_empty() => return Confirmation::NoAddress,
        Some(Value::String(s)) if is_email_address(s) => s.clone(),
        Some(_) => {
            return Confirmation::InvalidAddress {
                field: field.to_string(),
            }
        }
    };

    match mailer
        .send_template(EMAIL_CONFIRMATION_TEMPLATE, form, data, vec![address.clone()])
        .await
    {
        Ok(()) => Confirmation::Sent(address),
        Err(err) => {
            tracing::error!(
                form_id = %form.id,
                error = %err,
                "submission confirmation email failed"
            );
            Confirmation::Failed(address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::InMemoryBackend;
    use formpipe_forms::Area;
    use serde_json::json;
    use std::sync::Arc;

    fn form() -> FormDefinition {
        let mut form = FormDefinition::new("f", Area::default());
        form.send_confirmation_email = true;
        form.email_confirmation_field = Some("email".into());
        form
    }

    fn data(value: Value) -> SubmissionData {
        value.as_object().cloned().unwrap()
    }

    fn mailer() -> (Mailer, InMemoryBackend) {
        let backend = InMemoryBackend::new();
        (Mailer::new(Arc::new(backend.clone()), "webmaster@localhost"), backend)
    }

    #[tokio::test]
    async fn test_sends_to_submitter() {
        let (mailer, backend) = mailer();
        let outcome = send_confirmation(&mailer, &form(), &data(json!({"email": "ada@example.com"}))).await;
        assert_eq!(outcome, Confirmation::Sent("ada@example.com".into()));
        let sent = backend.get_messages().await;
        assert_eq!(sent[0].to, vec!["ada@example.com"]);
        assert_eq!(sent[0].template, EMAIL_CONFIRMATION_TEMPLATE);
    }

    #[tokio::test]
    async fn test_disabled() {
        let (mailer, backend) = mailer();
        let mut form = form();
        form.send_confirmation_email = false;
        let outcome = send_confirmation(&mailer, &form, &data(json!({"email": "ada@example.com"}))).await;
        assert_eq!(outcome, Confirmation::Disabled);

        let mut form = self::form();
        form.email_confirmation_field = None;
        let outcome = send_confirmation(&mailer, &form, &data(json!({"email": "ada@example.com"}))).await;
        assert_eq!(outcome, Confirmation::Disabled);
        assert_eq!(backend.message_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let (mailer, backend) = mailer();
        for value in [json!("not an address"), json!(["ada@example.com"])] {
            let outcome = send_confirmation(&mailer, &form(), &data(json!({"email": value}))).await;
            assert_eq!(
                outcome,
                Confirmation::InvalidAddress {
                    field: "email".into()
                }
            );
        }
        assert_eq!(backend.message_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_address() {
        let (mailer, _) = mailer();
        let outcome = send_confirmation(&mailer, &form(), &data(json!({"email": ""}))).await;
        assert_eq!(outcome, Confirmation::NoAddress);
        let outcome = send_confirmation(&mailer, &form(), &SubmissionData::new()).await;
        assert_eq!(outcome, Confirmation::NoAddress);
    }
}
