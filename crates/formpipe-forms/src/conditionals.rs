//! Conditional visibility.
//!
//! Fields nested in a conditional container are only meaningful when the
//! controlling field was answered with the container's value. Resolution runs
//! in two steps over request-local state:
//!
//! 1. [`build_conditionals`] records, for every controlling field and value,
//!    the fields that depend on it.
//! 2. [`resolve_skip_set`] compares the raw input against that map and
//!    returns the fields whose condition is not met.
//!
//! ```
//! use formpipe_forms::conditionals::{build_conditionals, resolve_skip_set};
//! use formpipe_forms::widgets::{Area, Widget};
//! use serde_json::json;
//!
//! let root = Area::new(vec![
//!     Widget::field("radio", "newsletter"),
//!     Widget::conditional("newsletter", "yes", vec![Widget::field("email", "address")]),
//! ]);
//! let conditionals = build_conditionals(&root);
//!
//! let input = json!({"newsletter": "no"});
//! let skip = resolve_skip_set(&conditionals, input.as_object().unwrap());
//! assert!(skip.contains("address"));
//! ```

use std::collections::{btree_map, BTreeMap, BTreeSet};

use serde_json::Value;

use crate::form::SubmissionData;
use crate::widgets::{Area, Widget};

/// The checkbox encoding of a checked box.
const CHECKED_VALUE: &str = "on";

/// Dependent fields keyed by controlling field name, then controlling value.
///
/// Never holds an empty dependent list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalsMap {
    conditions: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl ConditionalsMap {
    /// Returns the fields that depend on `name` having `value`.
    pub fn get(&self, name: &str, value: &str) -> Option<&[String]> {
        self.conditions
            .get(name)
            .and_then(|values| values.get(value))
            .map(Vec::as_slice)
    }

    /// Iterates over controlling field names and their value buckets.
    pub fn iter(&self) -> btree_map::Iter<'_, String, BTreeMap<String, Vec<String>>> {
        self.conditions.iter()
    }

    /// Returns `true` if no conditions are tracked.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns the number of controlling fields.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    fn track(&mut self, name: &str, value: &str, fields: Vec<&str>) {
        if fields.is_empty() {
            return;
        }
        let bucket = self
            .conditions
            .entry(name.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default();
        for field in fields {
            if !bucket.iter().any(|existing| existing == field) {
                bucket.push(field.to_string());
            }
        }
    }
}

/// Collects every conditional container in the tree into a [`ConditionalsMap`].
///
/// A container's bucket holds all fields nested anywhere inside it, so fields
/// of an inner container are also governed by the outer one. Containers with
/// no fields are not tracked.
pub fn build_conditionals(root: &Area) -> ConditionalsMap {
    let mut map = ConditionalsMap::default();
    for area in root.walk_areas() {
        for widget in &area.items {
            if let Widget::Conditional(conditional) = widget {
                map.track(
                    &conditional.condition_name,
                    &conditional.condition_value,
                    conditional.contents.field_names(),
                );
            }
        }
    }
    map
}

/// Field names excluded from sanitization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(BTreeSet<String>);

impl SkipSet {
    /// Creates an empty skip set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the field is skipped.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    /// Iterates over skipped field names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the number of skipped fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is skipped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SkipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Returns whether a submitted value satisfies a tracked condition value.
///
/// Only an identical string matches, except that `true` matches `"on"`.
fn condition_met(submitted: Option<&Value>, expected: &str) -> bool {
    match submitted {
        Some(Value::String(s)) => s == expected,
        Some(Value::Bool(true)) => expected == CHECKED_VALUE,
        _ => false,
    }
}

/// Computes the fields whose governing condition is not met by `input`.
pub fn resolve_skip_set(conditionals: &ConditionalsMap, input: &SubmissionData) -> SkipSet {
    let mut skip = BTreeSet::new();
    for (name, values) in conditionals.iter() {
        let submitted = input.get(name);
        for (value, fields) in values {
            if !condition_met(submitted, value) {
                skip.extend(fields.iter().cloned());
            }
        }
    }
    SkipSet(skip)
}
