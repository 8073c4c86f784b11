//! Email messages and delivery backends.
//!
//! ## Backends
//!
//! - [`ConsoleBackend`] - Prints emails to stdout (for development)
//! - [`InMemoryBackend`] - Collects emails in memory (for testing)
//!
//! Messages name a template and carry the template context; rendering the
//! final markup is up to the backend. The built-in backends render a plain
//! text summary of the submitted input.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use formpipe_core::utils::display_text;
use formpipe_core::{FormError, FormResult, Settings};

/// An outgoing templated email.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// The template name (`emailSubmission`, `emailConfirmation`).
    pub template: String,
    /// The subject line.
    pub subject: String,
    /// The sender address.
    pub from_email: String,
    /// The recipients.
    pub to: Vec<String>,
    /// The template context, `{"form": ..., "input": ...}`.
    pub context: Value,
}

impl EmailMessage {
    /// Creates a message with an empty context.
    pub fn new(
        template: impl Into<String>,
        subject: impl Into<String>,
        from_email: impl Into<String>,
        to: Vec<String>,
    ) -> Self {
        Self {
            template: template.into(),
            subject: subject.into(),
            from_email: from_email.into(),
            to,
            context: Value::Null,
        }
    }

    /// Sets the template context.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Renders the submitted input as `name: value` lines.
    pub fn render_body(&self) -> String {
        use std::fmt::Write;
        let mut body = String::new();
        if let Some(Value::Object(input)) = self.context.get("input") {
            for (name, value) in input {
                let _ = writeln!(body, "{name}: {}", display_text(value));
            }
        }
        body
    }

    /// Formats the email as a human-readable string.
    pub fn format_message(&self) -> String {
        use std::fmt::Write;
        let mut output = String::new();
        let _ = writeln!(output, "From: {}", self.from_email);
        let _ = writeln!(output, "To: {}", self.to.join(", "));
        let _ = writeln!(output, "Subject: {}", self.subject);
        let _ = writeln!(output, "X-Template: {}", self.template);
        let _ = writeln!(output, "\n{}", self.render_body());
        output
    }
}

/// A backend for sending email messages.
#[async_trait]
pub trait EmailBackend: Send + Sync {
    /// Sends a single email message.
    async fn send(&self, message: &EmailMessage) -> FormResult<()>;
}

/// An email backend that prints emails to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleBackend;

#[async_trait]
impl EmailBackend for ConsoleBackend {
    async fn send(&self, message: &EmailMessage) -> FormResult<()> {
        let separator = "-".repeat(60);
        let formatted = message.format_message();

        tokio::task::spawn_blocking(move || {
            println!("{separator}");
            print!("{formatted}");
            println!("{separator}");
        })
        .await
        .map_err(|e| FormError::Delivery(e.to_string()))?;

        Ok(())
    }
}

/// An email backend that collects emails in memory.
///
/// Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    messages: Arc<RwLock<Vec<EmailMessage>>>,
}

impl InMemoryBackend {
    /// Creates a new in-memory email backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all sent messages.
    pub async fn get_messages(&self) -> Vec<EmailMessage> {
        self.messages.read().await.clone()
    }

    /// Returns the number of sent messages.
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Clears all stored messages.
    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }
}

#[async_trait]
impl EmailBackend for InMemoryBackend {
    async fn send(&self, message: &EmailMessage) -> FormResult<()> {
        if message.to.is_empty() {
            return Err(FormError::Delivery(
                "Email must have at least one recipient".to_string(),
            ));
        }

        self.messages.write().await.push(message.clone());
        Ok(())
    }
}

/// Builds the backend named by `settings.email_backend`.
///
/// # Errors
///
/// Returns [`FormError::ConfigurationError`] for an unknown backend name.
pub fn backend_from_settings(settings: &Settings) -> FormResult<Arc<dyn EmailBackend>> {
    match settings.email_backend.as_str() {
        "console" => Ok(Arc::new(ConsoleBackend)),
        "memory" | "locmem" => Ok(Arc::new(InMemoryBackend::new())),
        other => Err(FormError::ConfigurationError(format!(
            "unknown email backend `{other}`"
        ))),
    }
}
