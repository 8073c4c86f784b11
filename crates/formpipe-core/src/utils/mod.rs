//! Value coercion helpers for formpipe.
//!
//! This module provides:
//! - [`text`]: String laundering, clamping, and quote-aware list splitting.
//! - [`value`]: Truthiness and text views of submitted JSON values.
//! - [`validators`]: Shape checks such as email addresses.

pub mod text;
pub mod validators;
pub mod value;

pub use validators::is_email_address;
pub use text::{clamp_chars, launder_string, split_quoted_list, strip_tags};
pub use value::{display_text, is_truthy, scalar_text};
