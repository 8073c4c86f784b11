//! Owner notification end to end through the in-memory backend.

use std::sync::Arc;

use async_trait::async_trait;
use formpipe_core::{FormError, FormResult, Settings};
use formpipe_forms::{Area, FormDefinition, MailRule, SubmissionData};
use formpipe_mail::{
    send_email_submissions, EmailBackend, EmailMessage, InMemoryBackend, Mailer, Notification,
};
use serde_json::{json, Value};

struct BrokenBackend;

#[async_trait]
impl EmailBackend for BrokenBackend {
    async fn send(&self, _message: &EmailMessage) -> FormResult<()> {
        Err(FormError::Delivery("connection refused".into()))
    }
}

fn form() -> FormDefinition {
    let mut form = FormDefinition::new("order", Area::default());
    form.title = "New order".into();
    form.email = Some("forms@example.com".into());
    form.emails = vec![
        MailRule::new("sales@example.com").when("toppings", "olives"),
        MailRule::new("kitchen@example.com"),
        MailRule::new("sales@example.com"),
    ];
    form
}

fn data(value: Value) -> SubmissionData {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_delivers_once_with_flattened_lists() {
    let backend = InMemoryBackend::new();
    let mailer = Mailer::new(Arc::new(backend.clone()), "webmaster@localhost");
    let outcome = send_email_submissions(
        &mailer,
        &form(),
        &data(json!({"toppings": ["olives", "basil"]})),
    )
    .await;

    assert_eq!(
        outcome,
        Notification::Delivered(vec![
            "sales@example.com".into(),
            "kitchen@example.com".into()
        ])
    );
    let sent = backend.get_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from_email, "forms@example.com");
    assert_eq!(sent[0].subject, "New order");
    assert_eq!(sent[0].context["input"]["toppings"], "olives, basil");
}

#[tokio::test]
async fn test_dry_run_returns_recipients() {
    let backend = InMemoryBackend::new();
    let settings = Settings {
        testing: true,
        ..Settings::default()
    };
    let mailer = Mailer::with_backend(&settings, Arc::new(backend.clone()));
    let outcome = send_email_submissions(&mailer, &form(), &data(json!({}))).await;

    assert_eq!(
        outcome,
        Notification::DryRun(vec!["kitchen@example.com".into(), "sales@example.com".into()])
    );
    assert_eq!(backend.message_count().await, 0);
}

#[tokio::test]
async fn test_disabled_by_settings_or_form() {
    let backend = InMemoryBackend::new();
    let settings = Settings {
        email_submissions: false,
        ..Settings::default()
    };
    let mailer = Mailer::with_backend(&settings, Arc::new(backend.clone()));
    assert_eq!(
        send_email_submissions(&mailer, &form(), &data(json!({}))).await,
        Notification::Disabled
    );

    let mailer = Mailer::new(Arc::new(backend.clone()), "webmaster@localhost");
    let bare = FormDefinition::new("bare", Area::default());
    assert_eq!(
        send_email_submissions(&mailer, &bare, &data(json!({}))).await,
        Notification::Disabled
    );
    assert_eq!(backend.message_count().await, 0);
}

#[tokio::test]
async fn test_no_matching_rule() {
    let mut form = form();
    form.emails = vec![MailRule::new("sales@example.com").when("toppings", "olives")];
    let mailer = Mailer::new(Arc::new(InMemoryBackend::new()), "webmaster@localhost");
    assert_eq!(
        send_email_submissions(&mailer, &form, &data(json!({"toppings": ["ham"]}))).await,
        Notification::NoRecipients
    );
}

#[tokio::test]
async fn test_delivery_failure_is_swallowed() {
    let mailer = Mailer::new(Arc::new(BrokenBackend), "webmaster@localhost");
    let outcome = send_email_submissions(&mailer, &form(), &data(json!({}))).await;
    assert!(matches!(outcome, Notification::Failed(_)));
    assert_eq!(outcome.recipients().len(), 2);
}
