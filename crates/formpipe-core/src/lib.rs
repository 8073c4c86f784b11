//! # formpipe-core
//!
//! Core types, settings, and error types for the formpipe submission pipeline.
//! This crate has no pipeline dependencies and provides the foundation for all
//! other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`utils`] - Value coercion helpers (laundering, clamping, truthiness, list parsing)
//! - [`settings`] - Pipeline settings
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{FieldError, FormError, FormResult, InvalidSubmission};
pub use settings::Settings;
