//! Capability list normalization
//!
//! OFL capabilities show up as a single object, a list of objects, or (when
//! sources mix the `capability`/`capabilities` keys) a list of lists. This
//! flattens them into one ordered list of objects. The objects themselves are
//! not translated to Spectrum's capability shape.

use serde_json::{Map, Value};

/// Flatten a capability field into an ordered list of capability objects
///
/// Nested lists are flattened one level. Anything that is not an object
/// (strings, numbers, deeper lists) is dropped.
pub fn normalize_capabilities(field: &Value) -> Vec<Map<String, Value>> {
    match field {
        Value::Object(capability) => vec![capability.clone()],
        Value::Array(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::Object(capability) => vec![capability.clone()],
                Value::Array(nested) => nested
                    .iter()
                    .filter_map(Value::as_object)
                    .cloned()
                    .collect(),
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Same as [`normalize_capabilities`], wrapped back into a JSON array
pub fn normalized_value(field: &Value) -> Value {
    Value::Array(
        normalize_capabilities(field)
            .into_iter()
            .map(Value::Object)
            .collect(),
    )
}
