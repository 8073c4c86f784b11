//! User-facing notices raised by submission handlers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::context::SubmissionContext;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something the submitter should fix.
    Warning,
}

/// A notice for the submitter, identified by a message key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    /// The message key.
    pub key: String,
    /// The severity.
    pub level: NoticeLevel,
    /// Values interpolated into the message.
    pub interpolate: Map<String, Value>,
}

impl Notice {
    /// Creates a warning.
    pub fn warning(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            level: NoticeLevel::Warning,
            interpolate: Map::new(),
        }
    }

    /// Adds an interpolated value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.interpolate.insert(name.into(), value.into());
        self
    }
}

/// Delivers notices to the submitter.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notice.
    async fn notify(&self, ctx: &SubmissionContext, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, ctx: &SubmissionContext, notice: Notice) {
        let interpolate = Value::Object(notice.interpolate);
        match notice.level {
            NoticeLevel::Info => {
                tracing::info!(request_id = %ctx.request_id, key = %notice.key, %interpolate, "notice");
            }
            NoticeLevel::Warning => {
                tracing::warn!(request_id = %ctx.request_id, key = %notice.key, %interpolate, "notice");
            }
        }
    }
}

/// Collects notices in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    notices: Arc<RwLock<Vec<(String, Notice)>>>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected notices with their request ids.
    pub async fn notices(&self) -> Vec<(String, Notice)> {
        self.notices.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, ctx: &SubmissionContext, notice: Notice) {
        self.notices
            .write()
            .await
            .push((ctx.request_id.clone(), notice));
    }
}
