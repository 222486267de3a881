//! Open Fixture Library (OFL) fixture model
//!
//! OFL fixture files are loosely shaped JSON. Fields whose shape varies between
//! fixtures (capability key names, string vs. object mode channels, matrix data)
//! are classified once here, at ingestion, so the converter never has to
//! re-inspect raw JSON.
//!
//! Missing or `null` fields fall back to their empty default. A field present
//! with the wrong JSON type (e.g. `"name": 5`) is a parse error for the whole
//! file.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

use crate::matrix::Matrix;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse fixture: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Fixture root must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("Failed to serialize fixture: {0}")]
    SerializeError(#[source] serde_json::Error),
}

/// A single OFL fixture definition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFixture {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manufacturer_key: String,
    #[serde(default, rename = "oflURL", deserialize_with = "null_as_default")]
    pub ofl_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub matrix: Matrix,
    /// Channel definitions in file order
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_channels: IndexMap<String, SourceChannel>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modes: Vec<SourceMode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_modify_date: String,
}

/// Where a channel's capabilities were found
///
/// OFL uses `capability` for single-capability channels and `capabilities`
/// for lists. When both are present, `capabilities` wins.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityField {
    Capabilities(Value),
    Capability(Value),
    Absent,
}

impl CapabilityField {
    /// The capability value exactly as it appeared in the source file
    pub fn raw(&self) -> Value {
        match self {
            CapabilityField::Capabilities(value) | CapabilityField::Capability(value) => {
                value.clone()
            }
            CapabilityField::Absent => Value::Array(Vec::new()),
        }
    }
}

/// An `availableChannels` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct SourceChannel {
    pub capabilities: CapabilityField,
}

impl From<Value> for SourceChannel {
    fn from(value: Value) -> Self {
        let capabilities = match value {
            Value::Object(mut map) => {
                if let Some(value) = map.remove("capabilities") {
                    CapabilityField::Capabilities(value)
                } else if let Some(value) = map.remove("capability") {
                    CapabilityField::Capability(value)
                } else {
                    CapabilityField::Absent
                }
            }
            _ => CapabilityField::Absent,
        };
        Self { capabilities }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: Vec<ModeChannel>,
}

/// One entry of a mode's channel list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ModeChannel {
    /// Plain channel reference by name
    Named(String),
    /// `matrixChannels` insert repeated for each pixel, per-pixel ordering
    PixelMatrix { template_channels: Vec<String> },
    /// Any other insert directive; only its `name` survives conversion
    Directive { insert: Option<String>, name: String },
    /// `null` placeholders and non-string scalars
    Other,
}

impl From<Value> for ModeChannel {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => ModeChannel::Named(name),
            Value::Object(map) => classify_insert(&map),
            _ => ModeChannel::Other,
        }
    }
}

fn classify_insert(map: &Map<String, Value>) -> ModeChannel {
    let text = |key: &str| map.get(key).and_then(Value::as_str);

    let is_pixel_matrix = text("insert") == Some("matrixChannels")
        && text("repeatFor") == Some("eachPixelXYZ")
        && text("channelOrder") == Some("perPixel");

    if is_pixel_matrix {
        let template_channels = map
            .get("templateChannels")
            .and_then(Value::as_array)
            .map(|templates| {
                templates
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return ModeChannel::PixelMatrix { template_channels };
    }

    ModeChannel::Directive {
        insert: text("insert").map(str::to_string),
        name: text("name").unwrap_or_default().to_string(),
    }
}

impl SourceFixture {
    /// Parse a fixture from a JSON string
    pub fn from_json(content: &str) -> Result<Self, FixtureError> {
        Self::from_value(serde_json::from_str(content)?)
    }

    /// Parse a fixture from raw file bytes
    pub fn from_slice(content: &[u8]) -> Result<Self, FixtureError> {
        Self::from_value(serde_json::from_slice(content)?)
    }

    /// Load a fixture from a file
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read(path)?;
        Self::from_slice(&content)
    }

    pub fn from_value(value: Value) -> Result<Self, FixtureError> {
        if !value.is_object() {
            return Err(FixtureError::NotAnObject(json_type_name(&value)));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Pixel keys of the first row-group of the matrix, in file order
    pub fn pixel_keys(&self) -> &[String] {
        self.matrix.pixel_keys()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
