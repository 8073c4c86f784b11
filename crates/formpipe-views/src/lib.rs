//! # formpipe-views
//!
//! The submission boundary: form lookup, the submit operation, the handlers
//! that run for accepted submissions, and the HTTP API.
//!
//! ## Modules
//!
//! - [`context`] - Per-request context
//! - [`repository`] - Form lookup and id laundering
//! - [`challenge`] - Bot-challenge verification
//! - [`notify`] - User-facing notices
//! - [`handlers`] - Persistence, owner notification, confirmation email
//! - [`service`] - The submit operation
//! - [`server`] - The Axum router

pub mod challenge;
pub mod context;
pub mod handlers;
pub mod notify;
pub mod repository;
pub mod server;
pub mod service;

pub use challenge::{ChallengeVerifier, TokenPresenceVerifier};
pub use context::SubmissionContext;
pub use handlers::{submission_signal, Submission};
pub use notify::{LogNotifier, MemoryNotifier, Notice, Notifier};
pub use repository::{FormRepository, InMemoryFormRepository};
pub use server::{ApiError, FormApp};
pub use service::FormService;
