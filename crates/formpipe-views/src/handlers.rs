//! Handlers for accepted submissions.
//!
//! Each handler is a [`Receiver`] on the `submission` signal. They run after
//! sanitization succeeded; a failing handler is logged by the signal and the
//! others still run. Handlers never modify the shared payload.

use std::sync::Arc;

use async_trait::async_trait;

use formpipe_core::FormResult;
use formpipe_forms::{FormDefinition, SubmissionData};
use formpipe_mail::confirmation::ERROR_EMAIL_CONFIRM;
use formpipe_mail::{send_confirmation, send_email_submissions, Confirmation, Mailer};
use formpipe_signals::{Receiver, Signal};
use formpipe_store::{SubmissionRecord, SubmissionStore};

use crate::context::SubmissionContext;
use crate::notify::{Notice, Notifier};

/// Name of the signal raised for accepted submissions.
pub const SUBMISSION_SIGNAL: &str = "submission";

/// The payload of the `submission` signal.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The request the submission arrived with.
    pub context: SubmissionContext,
    /// The form that was submitted.
    pub form: Arc<FormDefinition>,
    /// The sanitized values.
    pub data: SubmissionData,
}

/// Persists submissions.
pub struct SaveSubmission {
    store: Arc<dyn SubmissionStore>,
    enabled: bool,
}

impl SaveSubmission {
    /// Creates the handler. When `enabled` is false nothing is stored.
    pub fn new(store: Arc<dyn SubmissionStore>, enabled: bool) -> Self {
        Self { store, enabled }
    }
}

#[async_trait]
impl Receiver<Submission> for SaveSubmission {
    async fn receive(&self, submission: &Submission) -> FormResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let record = SubmissionRecord::new(submission.form.id.clone(), submission.data.clone());
        self.store.insert(&record).await?;
        tracing::debug!(
            request_id = %submission.context.request_id,
            record_id = %record.id,
            "submission saved"
        );
        Ok(())
    }
}

/// Notifies the form's owners.
pub struct EmailSubmission {
    mailer: Mailer,
}

impl EmailSubmission {
    /// Creates the handler.
    pub fn new(mailer: Mailer) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Receiver<Submission> for EmailSubmission {
    async fn receive(&self, submission: &Submission) -> FormResult<()> {
        let outcome = send_email_submissions(&self.mailer, &submission.form, &submission.data).await;
        tracing::debug!(
            request_id = %submission.context.request_id,
            ?outcome,
            "owner notification"
        );
        Ok(())
    }
}

/// Sends the submitter a confirmation email.
pub struct EmailConfirmation {
    mailer: Mailer,
    notifier: Arc<dyn Notifier>,
}

impl EmailConfirmation {
    /// Creates the handler. Malformed addresses are reported via `notifier`.
    pub fn new(mailer: Mailer, notifier: Arc<dyn Notifier>) -> Self {
        Self { mailer, notifier }
    }
}

#[async_trait]
impl Receiver<Submission> for EmailConfirmation {
    async fn receive(&self, submission: &Submission) -> FormResult<()> {
        let ctx = &submission.context;
        match send_confirmation(&self.mailer, &submission.form, &submission.data).await {
            Confirmation::InvalidAddress { field } => {
                self.notifier
                    .notify(ctx, Notice::warning(ERROR_EMAIL_CONFIRM).with("field", field))
                    .await;
            }
            Confirmation::NoAddress => {
                tracing::info!(
                    request_id = %ctx.request_id,
                    form_id = %submission.form.id,
                    "no confirmation address supplied"
                );
            }
            outcome => {
                tracing::debug!(request_id = %ctx.request_id, ?outcome, "confirmation email");
            }
        }
        Ok(())
    }
}

/// Creates the `submission` signal with the standard handlers connected, in
/// order: `save_submission`, `email_submission`, `email_confirmation`.
pub fn submission_signal(
    store: Arc<dyn SubmissionStore>,
    save_submissions: bool,
    mailer: &Mailer,
    notifier: Arc<dyn Notifier>,
) -> Signal<Submission> {
    let signal = Signal::new(SUBMISSION_SIGNAL);
    signal.connect(
        "save_submission",
        Arc::new(SaveSubmission::new(store, save_submissions)),
    );
    signal.connect("email_submission", Arc::new(EmailSubmission::new(mailer.clone())));
    signal.connect(
        "email_confirmation",
        Arc::new(EmailConfirmation::new(mailer.clone(), notifier)),
    );
    signal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use formpipe_forms::{Area, MailRule};
    use formpipe_mail::InMemoryBackend;
    use formpipe_store::InMemorySubmissionStore;
    use serde_json::json;

    fn submission(form: FormDefinition, data: serde_json::Value) -> Submission {
        Submission {
            context: SubmissionContext::new(),
            form: Arc::new(form),
            data: data.as_object().cloned().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_save_submission() {
        let store = InMemorySubmissionStore::new();
        let handler = SaveSubmission::new(Arc::new(store.clone()), true);
        let form = FormDefinition::new("contact", Area::default());
        handler
            .receive(&submission(form.clone(), json!({"name": "Ada"})))
            .await
            .unwrap();
        let records = store.all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].form_id, "contact");
        assert_eq!(records[0].data["name"], "Ada");

        let disabled = SaveSubmission::new(Arc::new(store.clone()), false);
        disabled.receive(&submission(form, json!({}))).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_confirmation_warns_on_bad_address() {
        let notifier = MemoryNotifier::new();
        let backend = InMemoryBackend::new();
        let mailer = Mailer::new(Arc::new(backend.clone()), "webmaster@localhost");
        let handler = EmailConfirmation::new(mailer, Arc::new(notifier.clone()));

        let mut form = FormDefinition::new("f", Area::default());
        form.send_confirmation_email = true;
        form.email_confirmation_field = Some("email".into());
        handler
            .receive(&submission(form, json!({"email": "nope"})))
            .await
            .unwrap();

        let notices = notifier.notices().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].1.key, ERROR_EMAIL_CONFIRM);
        assert_eq!(notices[0].1.interpolate["field"], "email");
        assert_eq!(backend.message_count().await, 0);
    }

    #[tokio::test]
    async fn test_standard_signal_order_and_isolation() {
        let store = InMemorySubmissionStore::new();
        let backend = InMemoryBackend::new();
        let mailer = Mailer::new(Arc::new(backend.clone()), "webmaster@localhost");
        let signal = submission_signal(
            Arc::new(store.clone()),
            true,
            &mailer,
            Arc::new(MemoryNotifier::new()),
        );
        assert_eq!(
            signal.receiver_ids(),
            vec!["save_submission", "email_submission", "email_confirmation"]
        );

        let mut form = FormDefinition::new("f", Area::default());
        form.emails = vec![MailRule::new("owner@example.com")];
        let outcomes = signal.send(&submission(form, json!({"tags": ["a", "b"]}))).await;
        assert!(outcomes.iter().all(formpipe_signals::ReceiverOutcome::is_ok));

        // The owner email sees flattened lists; the stored record does not.
        let stored = store.all().await;
        assert_eq!(stored[0].data["tags"], json!(["a", "b"]));
        let sent = backend.get_messages().await;
        assert_eq!(sent[0].context["input"]["tags"], "a, b");
    }
}
