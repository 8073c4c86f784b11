//! Index definitions for the submission collection.

use serde::{Deserialize, Serialize};

/// Sort direction of one index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    const fn direction(self) -> i8 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// One key of a compound index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    /// The record field.
    pub field: String,
    /// The sort direction.
    pub order: SortOrder,
}

/// A compound index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// The keys, most significant first.
    pub keys: Vec<IndexKey>,
}

impl IndexSpec {
    /// Creates an index from `(field, order)` pairs.
    pub fn new(keys: &[(&str, SortOrder)]) -> Self {
        Self {
            keys: keys
                .iter()
                .map(|(field, order)| IndexKey {
                    field: (*field).to_string(),
                    order: *order,
                })
                .collect(),
        }
    }

    /// Returns the conventional index name, e.g. `formId_1_createdAt_-1`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|key| format!("{}_{}", key.field, key.order.direction()))
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// The indexes every submission store must carry: submissions of one form,
/// oldest first and newest first.
pub fn submission_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::new(&[("formId", SortOrder::Asc), ("createdAt", SortOrder::Asc)]),
        IndexSpec::new(&[("formId", SortOrder::Asc), ("createdAt", SortOrder::Desc)]),
    ]
}
