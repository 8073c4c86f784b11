//! Templated form emails.

use std::sync::Arc;

use serde_json::json;

use formpipe_core::{FormResult, Settings};
use formpipe_forms::{FormDefinition, SubmissionData};

use crate::email::{backend_from_settings, EmailBackend, EmailMessage};

/// Template sent to form owners.
pub const EMAIL_SUBMISSION_TEMPLATE: &str = "emailSubmission";
/// Template sent to the submitter.
pub const EMAIL_CONFIRMATION_TEMPLATE: &str = "emailConfirmation";

/// Sends form emails through a backend.
///
/// Also carries the switches controlling owner notification.
#[derive(Clone)]
pub struct Mailer {
    backend: Arc<dyn EmailBackend>,
    default_from_email: String,
    /// Whether owner notification is enabled.
    pub email_submissions: bool,
    /// Dry-run mode: routing reports recipients without delivering.
    pub testing: bool,
}

impl Mailer {
    /// Creates a mailer with notification enabled.
    pub fn new(backend: Arc<dyn EmailBackend>, default_from_email: impl Into<String>) -> Self {
        Self {
            backend,
            default_from_email: default_from_email.into(),
            email_submissions: true,
            testing: false,
        }
    }

    /// Creates a mailer from settings, building the configured backend.
    ///
    /// # Errors
    ///
    /// Fails when the configured backend is unknown.
    pub fn from_settings(settings: &Settings) -> FormResult<Self> {
        Ok(Self::with_backend(settings, backend_from_settings(settings)?))
    }

    /// Creates a mailer from settings with an explicit backend.
    pub fn with_backend(settings: &Settings, backend: Arc<dyn EmailBackend>) -> Self {
        Self {
            backend,
            default_from_email: settings.default_from_email.clone(),
            email_submissions: settings.email_submissions,
            testing: settings.testing,
        }
    }

    /// Builds the message for `template`.
    ///
    /// The sender is the form's address, or the default sender when the form
    /// has none; the subject is the form title.
    pub fn message(
        &self,
        template: &str,
        form: &FormDefinition,
        data: &SubmissionData,
        to: Vec<String>,
    ) -> EmailMessage {
        let from = form
            .email
            .as_deref()
            .filter(|email| !email.is_empty())
            .unwrap_or(&self.default_from_email);
        EmailMessage::new(template, form.title.clone(), from, to).with_context(json!({
            "form": form.summary(),
            "input": data,
        }))
    }

    /// Renders and sends `template` to `to`.
    ///
    /// # Errors
    ///
    /// Returns the backend's delivery error.
    pub async fn send_template(
        &self,
        template: &str,
        form: &FormDefinition,
        data: &SubmissionData,
        to: Vec<String>,
    ) -> FormResult<()> {
        let message = self.message(template, form, data, to);
        tracing::debug!(
            template,
            form_id = %form.id,
            recipients = message.to.len(),
            "sending form email"
        );
        self.backend.send(&message).await
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("default_from_email", &self.default_from_email)
            .field("email_submissions", &self.email_submissions)
            .field("testing", &self.testing)
            .finish_non_exhaustive()
    }
}
