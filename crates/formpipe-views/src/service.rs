//! The submit operation.
//!
//! [`FormService::submit`] takes one raw submission (`{_id, queryParams?,
//! ...fieldValues}`) through the whole pipeline:
//!
//! 1. Resolve the form by its laundered `_id`, or fail with `NotFound`.
//! 2. Run the bot challenge when the form enables it.
//! 3. Clean the submission: conditional fields, sanitization, query params.
//! 4. Raise the `submission` signal for the handlers.
//!
//! Everything up to step 3 is reported to the caller. Handler failures in
//! step 4 are logged and never reach the submitter.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use formpipe_core::logging::submission_span;
use formpipe_core::{FieldError, FormError, FormResult, Settings};
use formpipe_forms::{clean_submission, FieldRegistry, FormDefinition, SubmissionData};
use formpipe_mail::Mailer;
use formpipe_signals::Signal;
use formpipe_store::SubmissionStore;

use crate::challenge::{ChallengeVerifier, CHALLENGE_FAILED_MESSAGE};
use crate::context::SubmissionContext;
use crate::handlers::{submission_signal, Submission};
use crate::notify::Notifier;
use crate::repository::{launder_id, FormRepository};

/// The key holding the form id in a submission.
pub const FORM_ID_KEY: &str = "_id";

/// Processes submissions for a set of forms.
pub struct FormService {
    forms: Arc<dyn FormRepository>,
    registry: FieldRegistry,
    challenge: Option<Arc<dyn ChallengeVerifier>>,
    submission: Signal<Submission>,
}

impl FormService {
    /// Creates a service with the built-in field types and no handlers.
    pub fn new(forms: Arc<dyn FormRepository>) -> Self {
        Self {
            forms,
            registry: FieldRegistry::with_builtin_types(),
            challenge: None,
            submission: Signal::new(crate::handlers::SUBMISSION_SIGNAL),
        }
    }

    /// Creates a service with the standard handlers, configured from settings.
    pub fn from_settings(
        settings: &Settings,
        forms: Arc<dyn FormRepository>,
        store: Arc<dyn SubmissionStore>,
        mailer: &Mailer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            submission: submission_signal(store, settings.save_submissions, mailer, notifier),
            ..Self::new(forms)
        }
    }

    /// Replaces the field registry.
    #[must_use]
    pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the bot-challenge verifier.
    #[must_use]
    pub fn with_challenge(mut self, verifier: Arc<dyn ChallengeVerifier>) -> Self {
        self.challenge = Some(verifier);
        self
    }

    /// Returns the field registry.
    pub const fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Returns the `submission` signal, for connecting further handlers.
    pub const fn submission_signal(&self) -> &Signal<Submission> {
        &self.submission
    }

    /// Accepts one raw submission.
    ///
    /// # Errors
    ///
    /// - [`FormError::BadRequest`] if the submission is not a JSON object
    /// - [`FormError::NotFound`] if the id does not resolve to a form
    /// - [`FormError::Invalid`] if the challenge or any field fails
    /// - the systemic error of a field type that raised one
    pub async fn submit(&self, ctx: &SubmissionContext, input: Value) -> FormResult<()> {
        let Value::Object(input) = input else {
            return Err(FormError::BadRequest(
                "submission must be a JSON object".to_string(),
            ));
        };

        let form = self.resolve(&input).await?;
        let span = submission_span(&form.id, &ctx.request_id);
        self.process(ctx, form, input).instrument(span).await
    }

    async fn resolve(&self, input: &SubmissionData) -> FormResult<Arc<FormDefinition>> {
        let id = input
            .get(FORM_ID_KEY)
            .and_then(launder_id)
            .ok_or_else(|| FormError::NotFound("form".to_string()))?;
        self.forms
            .find(&id)
            .await?
            .ok_or_else(|| FormError::NotFound(format!("form {id}")))
    }

    async fn process(
        &self,
        ctx: &SubmissionContext,
        form: Arc<FormDefinition>,
        input: SubmissionData,
    ) -> FormResult<()> {
        let mut form_errors = Vec::new();
        if form.enable_recaptcha {
            self.check_challenge(ctx, &input, &mut form_errors).await?;
        }

        let data = match clean_submission(&form, &self.registry, &input, form_errors).await {
            Ok(data) => data,
            Err(err) => {
                tracing::info!(error = %err, "submission rejected");
                return Err(err);
            }
        };

        tracing::info!(fields = data.len(), "submission accepted");
        let submission = Submission {
            context: ctx.clone(),
            form,
            data,
        };
        self.submission.send(&submission).await;
        Ok(())
    }

    async fn check_challenge(
        &self,
        ctx: &SubmissionContext,
        input: &SubmissionData,
        form_errors: &mut Vec<FieldError>,
    ) -> FormResult<()> {
        let Some(verifier) = &self.challenge else {
            tracing::error!("form requires a challenge but no verifier is configured");
            return Err(FormError::invalid(vec![FieldError::global(
                CHALLENGE_FAILED_MESSAGE,
            )]));
        };
        if let Err(err) = verifier.verify(ctx, input, form_errors).await {
            tracing::error!(error = %err, "challenge verification error");
            return Err(FormError::invalid(std::mem::take(form_errors)));
        }
        Ok(())
    }
}

impl std::fmt::Debug for FormService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormService")
            .field("registry", &self.registry)
            .field("has_challenge", &self.challenge.is_some())
            .field("submission", &self.submission)
            .finish_non_exhaustive()
    }
}
