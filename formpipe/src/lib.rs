//! # formpipe
//!
//! A form submission pipeline: conditional fields, field sanitization,
//! query-parameter capture, persistence, and email routing.
//!
//! This is the facade crate that re-exports all sub-crates. Depend on
//! `formpipe` to get the whole pipeline, or on individual crates for
//! finer-grained control.

/// Errors, settings, logging, and value helpers.
pub use formpipe_core as core;

/// Async signals with ordered, isolated receivers.
pub use formpipe_signals as signals;

/// Form definitions, field types, conditionals, and sanitization.
pub use formpipe_forms as forms;

/// Email messages, backends, and recipient routing.
pub use formpipe_mail as mail;

/// Submission records and stores.
pub use formpipe_store as store;

/// The submit operation, its handlers, and the HTTP API.
pub use formpipe_views as views;

pub mod cli;

/// Commonly used types.
pub mod prelude {
    pub use formpipe_core::{FieldError, FormError, FormResult, Settings};
    pub use formpipe_forms::{FieldRegistry, FormDefinition, SubmissionData};
    pub use formpipe_mail::Mailer;
    pub use formpipe_store::SubmissionStore;
    pub use formpipe_views::{FormApp, FormService, InMemoryFormRepository, SubmissionContext};
}
