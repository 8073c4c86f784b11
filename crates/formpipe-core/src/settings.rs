//! Settings for the formpipe pipeline.
//!
//! [`Settings`] holds the process-wide configuration: logging, the HTTP
//! boundary, and the switches controlling which submission handlers run.
//! Settings are loaded once at start-up (see [`crate::settings_loader`]) and
//! shared read-only afterwards.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The complete set of pipeline settings.
///
/// # Examples
///
/// ```
/// use formpipe_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.save_submissions);
/// assert!(settings.email_submissions);
/// assert!(!settings.testing);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The log filter (e.g. "info", "formpipe_views=debug").
    pub log_level: String,

    // ── HTTP ─────────────────────────────────────────────────────────

    /// Address the HTTP server binds to.
    pub bind_address: String,
    /// Route prefix for the submission API.
    pub api_prefix: String,

    // ── Submission handlers ──────────────────────────────────────────

    /// Whether accepted submissions are persisted.
    pub save_submissions: bool,
    /// Whether form owners are notified by email.
    pub email_submissions: bool,
    /// Dry-run mode: routing returns recipients instead of delivering.
    pub testing: bool,

    // ── Email ────────────────────────────────────────────────────────

    /// The email backend ("console" or "memory").
    pub email_backend: String,
    /// Sender used when a form has no address of its own.
    pub default_from_email: String,

    // ── Storage ──────────────────────────────────────────────────────

    /// JSON-lines file receiving submissions. In-memory when unset.
    pub submissions_path: Option<PathBuf>,
    /// JSON file holding the form definitions.
    pub forms_path: Option<PathBuf>,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),

            bind_address: "127.0.0.1:3000".to_string(),
            api_prefix: "/api/v1/form".to_string(),

            save_submissions: true,
            email_submissions: true,
            testing: false,

            email_backend: "console".to_string(),
            default_from_email: "webmaster@localhost".to_string(),

            submissions_path: None,
            forms_path: None,

            extra: HashMap::new(),
        }
    }
}
