//! Pixel matrix detection
//!
//! Spectrum manifests cannot address individual pixels, so any fixture that
//! declares matrix data is skipped as a whole instead of being converted with
//! broken channel addressing.

use serde::Deserialize;
use serde_json::Value;

use crate::ofl::SourceFixture;

/// The `matrix` block of an OFL fixture
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Matrix {
    declared: bool,
    pixel_keys: Vec<String>,
}

impl Matrix {
    /// Whether the fixture carries any matrix data at all
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    /// Flattened pixel keys of the first z-layer, empty keys removed
    pub fn pixel_keys(&self) -> &[String] {
        &self.pixel_keys
    }
}

impl From<Value> for Matrix {
    fn from(value: Value) -> Self {
        let pixel_keys = value
            .get("pixelKeys")
            .map(first_layer_keys)
            .unwrap_or_default();

        Self {
            declared: is_truthy(&value),
            pixel_keys,
        }
    }
}

// pixelKeys is laid out [z][y][x]; only the first z-layer is used.
fn first_layer_keys(pixel_keys: &Value) -> Vec<String> {
    let Some(layer) = pixel_keys.as_array().and_then(|layers| layers.first()) else {
        return Vec::new();
    };

    layer
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// JSON truthiness: null, false, 0, "", [] and {} are all "empty"
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Returns true if the fixture declares pixel-matrix data
pub fn has_matrix(fixture: &SourceFixture) -> bool {
    fixture.matrix.is_declared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(value: Value) -> SourceFixture {
        SourceFixture::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_matrix_is_not_a_matrix() {
        assert!(!has_matrix(&fixture(json!({"matrix": {}}))));
        assert!(!has_matrix(&fixture(json!({"matrix": null}))));
        assert!(!has_matrix(&fixture(json!({"name": "Par"}))));
    }

    #[test]
    fn test_pixel_keys_make_a_matrix() {
        let f = fixture(json!({"matrix": {"pixelKeys": [[["1"]]]}}));
        assert!(has_matrix(&f));
        assert_eq!(f.pixel_keys(), ["1"]);
    }

    #[test]
    fn test_pixel_count_only_matrix() {
        let f = fixture(json!({"matrix": {"pixelCount": [8, 1, 1]}}));
        assert!(has_matrix(&f));
        assert!(f.pixel_keys().is_empty());
    }

    #[test]
    fn test_first_layer_flattened_in_order() {
        let f = fixture(json!({
            "matrix": {
                "pixelKeys": [
                    [["A1", "A2", null], ["B1", "", "B3"]],
                    [["Z1", "Z2", "Z3"]]
                ]
            }
        }));
        assert_eq!(f.pixel_keys(), ["A1", "A2", "B1", "B3"]);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!([0])));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(-1)));
    }
}
