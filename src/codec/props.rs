//! Property-map and label-set field encoding
//!
//! Encoding must be exact for byte-identical round trips: an empty map
//! becomes [`PROPS_NONE`] (never `"{}"`), a non-empty map becomes compact
//! JSON with keys in ascending order, and labels are joined in the set's
//! ascending iteration order.

use crate::consts::{LABEL_SEPARATOR, PROPS_NONE, PROPS_NULL};
use crate::error::{GraphError, Result};
use crate::model::PropMap;
use serde_json::Value;
use std::collections::BTreeSet;

/// Decode a `props` field
///
/// # Errors
///
/// Returns [`GraphError::Schema`] if the field is neither the sentinel nor a
/// JSON object of scalar values
pub fn load_props(props: &str) -> Result<PropMap> {
    if props == PROPS_NONE || props == PROPS_NULL {
        return Ok(PropMap::new());
    }

    let value: Value = serde_json::from_str(props)
        .map_err(|e| GraphError::Schema(format!("props is not valid JSON: {e}")))?;

    let Value::Object(prop_map) = value else {
        return Err(GraphError::Schema(format!(
            "props must be a JSON object, got |{props}|"
        )));
    };

    if let Some((key, _)) = prop_map
        .iter()
        .find(|(_, v)| matches!(v, Value::Array(_) | Value::Object(_)))
    {
        return Err(GraphError::Schema(format!(
            "property |{key}| is not a JSON scalar"
        )));
    }

    Ok(prop_map)
}

/// Encode a property map as a `props` field
#[must_use]
pub fn save_props(prop_map: &PropMap) -> String {
    if prop_map.is_empty() {
        return PROPS_NONE.to_string();
    }

    // Key order must not depend on serde_json's `preserve_order` feature
    let mut entries: Vec<_> = prop_map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
    .to_string()
}

/// Decode a `labels` field; absent or empty decodes to the empty set
#[must_use]
pub fn load_labels(labels: Option<&str>) -> BTreeSet<String> {
    labels
        .unwrap_or_default()
        .split(LABEL_SEPARATOR)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Encode a label set as a `labels` field
#[must_use]
pub fn save_labels(label_set: &BTreeSet<String>) -> String {
    let mut labels = String::new();

    for (i, label) in label_set.iter().enumerate() {
        if i > 0 {
            labels.push(LABEL_SEPARATOR);
        }
        labels.push_str(label);
    }

    labels
}
