//! Per-request context.

use http::HeaderMap;
use uuid::Uuid;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request-scoped information passed to collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionContext {
    /// Correlates log lines of one submission.
    pub request_id: String,
    /// The client address, when known.
    pub remote_addr: Option<String>,
}

impl SubmissionContext {
    /// Creates a context with a fresh request id.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            remote_addr: None,
        }
    }

    /// Creates a context from request headers, reusing `x-request-id` when
    /// present.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        let remote_addr = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|addr| addr.trim().to_string());
        Self {
            request_id,
            remote_addr,
        }
    }
}

impl Default for SubmissionContext {
    fn default() -> Self {
        Self::new()
    }
}
