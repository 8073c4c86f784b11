//! Bot-challenge verification.
//!
//! Forms with `enableRecaptcha` must pass a [`ChallengeVerifier`] before they
//! are sanitized. A verifier either appends errors for the submitter to the
//! accumulator, or fails outright; both reject the submission.

use async_trait::async_trait;
use serde_json::Value;

use formpipe_core::{FieldError, FormResult};
use formpipe_forms::SubmissionData;

use crate::context::SubmissionContext;

/// Message for a missing or rejected challenge token.
pub const CHALLENGE_FAILED_MESSAGE: &str = "The security check could not be verified.";

/// Verifies the bot-challenge token of a submission.
#[async_trait]
pub trait ChallengeVerifier: Send + Sync {
    /// Checks the submission, appending user-facing errors to `errors`.
    ///
    /// Returning an error rejects the submission as invalid.
    async fn verify(
        &self,
        ctx: &SubmissionContext,
        input: &SubmissionData,
        errors: &mut Vec<FieldError>,
    ) -> FormResult<()>;
}

/// Accepts any submission carrying a non-empty token under `field`.
///
/// Suitable for development and tests where no remote verification service
/// is available.
#[derive(Debug, Clone)]
pub struct TokenPresenceVerifier {
    field: String,
}

impl TokenPresenceVerifier {
    /// Creates a verifier reading the token from `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Default for TokenPresenceVerifier {
    fn default() -> Self {
        Self::new("recaptcha")
    }
}

#[async_trait]
impl ChallengeVerifier for TokenPresenceVerifier {
    async fn verify(
        &self,
        ctx: &SubmissionContext,
        input: &SubmissionData,
        errors: &mut Vec<FieldError>,
    ) -> FormResult<()> {
        let present = matches!(input.get(&self.field), Some(Value::String(token)) if !token.trim().is_empty());
        if !present {
            tracing::debug!(request_id = %ctx.request_id, "challenge token missing");
            errors.push(FieldError::global(CHALLENGE_FAILED_MESSAGE));
        }
        Ok(())
    }
}
