//! # formpipe-store
//!
//! Persistence of accepted submissions. Each record is
//! `{_id, createdAt, formId, data}`; the collection is indexed by form and
//! creation time in both directions.
//!
//! ## Modules
//!
//! - [`record`] - The stored record
//! - [`index`] - Index definitions
//! - [`store`] - The [`SubmissionStore`] trait and its implementations

pub mod index;
pub mod record;
pub mod store;

pub use index::{submission_indexes, IndexSpec, SortOrder};
pub use record::SubmissionRecord;
pub use store::{
    ensure_collection, store_from_settings, InMemorySubmissionStore, JsonLinesStore,
    SubmissionStore,
};
