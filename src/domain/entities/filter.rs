use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single filter input of the dashboard. `attributes` holds whatever the
/// embedding application attaches to the field (label, options, widget kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    pub field_name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl FilterField {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            value: Value::Null,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// True when both fields expose the same set of keys.
    pub fn same_shape(&self, other: &FilterField) -> bool {
        self.attributes.keys().eq(other.attributes.keys())
    }

    /// `self` with every value carried by `cached` laid on top.
    pub fn overlaid_with(&self, cached: &FilterField) -> FilterField {
        let mut attributes = self.attributes.clone();
        attributes.extend(
            cached
                .attributes
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        FilterField {
            field_name: cached.field_name.clone(),
            value: cached.value.clone(),
            attributes,
        }
    }
}

/// Filter values that survived sanitisation, keyed by field name.
pub type SanitizedFilter = BTreeMap<String, Value>;
