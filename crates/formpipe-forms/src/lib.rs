//! # formpipe-forms
//!
//! Form definitions and the submission cleaning pipeline.
//!
//! ## Modules
//!
//! - [`widgets`] - The widget tree: areas, fields, conditional containers
//! - [`form`] - Form definitions, mail rules, and query-param specs
//! - [`registry`] - The field-type registry and the [`FieldType`] trait
//! - [`fields`] - Built-in field types
//! - [`conditionals`] - Conditional visibility resolution
//! - [`sanitize`] - Sanitization and the full cleaning pipeline
//! - [`query_params`] - Whitelisted query-string capture
//!
//! ## Example
//!
//! ```
//! use formpipe_forms::{clean_submission, FieldRegistry, FormDefinition};
//! use formpipe_forms::widgets::{Area, Widget};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let form = FormDefinition::new("contact", Area::new(vec![
//!     Widget::required_field("text", "name"),
//! ]));
//! let registry = FieldRegistry::with_builtin_types();
//!
//! let input = json!({"name": "  Ada  "});
//! let output = clean_submission(&form, &registry, input.as_object().unwrap(), vec![])
//!     .await
//!     .unwrap();
//! assert_eq!(output["name"], "Ada");
//! # });
//! ```

pub mod conditionals;
pub mod fields;
pub mod form;
pub mod query_params;
pub mod registry;
pub mod sanitize;
pub mod widgets;

pub use conditionals::{build_conditionals, resolve_skip_set, ConditionalsMap, SkipSet};
pub use form::{FormDefinition, MailCondition, MailRule, QueryParamSpec, SubmissionData};
pub use query_params::merge_query_params;
pub use registry::{FieldRegistry, FieldType, SanitizeError};
pub use sanitize::{clean_submission, sanitize, Sanitized};
pub use widgets::{Area, Widget};
