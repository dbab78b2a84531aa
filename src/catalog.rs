use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::{FilterSet, FilterValue};

/// A selectable filter option as served by `/brands` and `/categories`.
///
/// `value` is what goes on the wire, `label` is what a shopper reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type Brand = FilterOption;
pub type Category = FilterOption;

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        FilterOption {
            value: value.into(),
            label: label.into(),
            extra: Map::new(),
        }
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.value
        } else {
            &self.label
        }
    }

    /// Whether this option is among the current selections for `key`.
    pub fn is_selected(&self, filters: &FilterSet, key: &str) -> bool {
        match filters.get(key) {
            Some(FilterValue::One(v)) => *v == self.value,
            Some(FilterValue::Many(values)) => values.iter().any(|v| *v == self.value),
            None => false,
        }
    }
}
