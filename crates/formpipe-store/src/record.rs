//! Persisted submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One accepted submission, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// The record's identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// When the submission was accepted.
    pub created_at: DateTime<Utc>,
    /// The form the submission belongs to.
    pub form_id: String,
    /// The sanitized values.
    pub data: Map<String, Value>,
}

impl SubmissionRecord {
    /// Creates a record stamped with a fresh id and the current time.
    pub fn new(form_id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            form_id: form_id.into(),
            data,
        }
    }
}
