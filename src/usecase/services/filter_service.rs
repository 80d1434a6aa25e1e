use serde_json::Value;

use crate::domain::entities::filter::{FilterField, SanitizedFilter};

/// Keeps only filter fields that carry a value.
pub fn sanitize_filter(fields: &[FilterField]) -> SanitizedFilter {
    fields
        .iter()
        .filter(|field| has_filter_value(&field.value))
        .map(|field| (field.field_name.clone(), field.value.clone()))
        .collect()
}

fn has_filter_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Configured filter fields with the cached values of the last session laid
/// on top. The cache only applies when it describes exactly the same fields,
/// in the same order and with the same shape; otherwise `None`.
pub fn merge_recent_filters(
    configured: &[FilterField],
    recent: &[FilterField],
) -> Option<Vec<FilterField>> {
    if recent.len() != configured.len() {
        return None;
    }

    let same_names = configured
        .iter()
        .zip(recent)
        .all(|(field, cached)| field.field_name == cached.field_name);
    if !same_names {
        return None;
    }

    configured
        .iter()
        .zip(recent)
        .map(|(field, cached)| field.same_shape(cached).then(|| field.overlaid_with(cached)))
        .collect()
}
