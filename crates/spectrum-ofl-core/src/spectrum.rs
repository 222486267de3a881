//! Spectrum fixture manifest model
//!
//! Field declaration order is the serialized key order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ofl::FixtureError;

/// Manifest schema version written into every converted fixture
pub const SCHEMA_VERSION: &str = "1.0";

/// Oldest Spectrum release that can load the manifests we write
pub const MINIMUM_SPECTRUM_VERSION: &str = "2.1";

/// A Spectrum fixture manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumFixture {
    pub schema_version: String,
    pub minimum_spectrum_version: String,
    pub info: FixtureInfo,
    pub channels: IndexMap<String, Channel>,
    pub modes: Vec<Mode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureInfo {
    pub name: String,
    pub brand: String,
    pub website: String,
    pub videos: Vec<String>,
    pub date: String,
    /// Comma separated author list
    pub author: String,
    pub oflurl: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Capability data, passed through from OFL untranslated
    pub capabilities: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub name: String,
    #[serde(rename = "shortName")]
    pub short_name: String,
    pub channels: Vec<String>,
}

impl SpectrumFixture {
    /// Create an empty manifest with the current schema versions
    pub fn new(info: FixtureInfo) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            minimum_spectrum_version: MINIMUM_SPECTRUM_VERSION.to_string(),
            info,
            channels: IndexMap::new(),
            modes: Vec::new(),
        }
    }

    /// Serialize as 2-space indented JSON
    pub fn to_json_pretty(&self) -> Result<String, FixtureError> {
        serde_json::to_string_pretty(self).map_err(FixtureError::SerializeError)
    }

    /// Parse a previously written manifest
    pub fn from_json(content: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_layout() {
        let mut fixture = SpectrumFixture::new(FixtureInfo {
            name: "Par".to_string(),
            ..Default::default()
        });
        fixture.channels.insert(
            "Dimmer".to_string(),
            Channel {
                capabilities: json!([]),
            },
        );
        fixture.modes.push(Mode {
            name: "1-channel".to_string(),
            short_name: "1ch".to_string(),
            channels: vec!["Dimmer".to_string()],
        });

        let expected = r#"{
  "schema_version": "1.0",
  "minimum_spectrum_version": "2.1",
  "info": {
    "name": "Par",
    "brand": "",
    "website": "",
    "videos": [],
    "date": "",
    "author": "",
    "oflurl": "",
    "categories": []
  },
  "channels": {
    "Dimmer": {
      "capabilities": []
    }
  },
  "modes": [
    {
      "name": "1-channel",
      "shortName": "1ch",
      "channels": [
        "Dimmer"
      ]
    }
  ]
}"#;
        assert_eq!(fixture.to_json_pretty().unwrap(), expected);
    }

    #[test]
    fn test_read_back() {
        let fixture = SpectrumFixture::new(FixtureInfo::default());
        let json = fixture.to_json_pretty().unwrap();
        let parsed = SpectrumFixture::from_json(&json).unwrap();
        assert_eq!(parsed, fixture);
    }
}
