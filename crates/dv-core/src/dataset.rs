//! Dataset records handed out by the dataset gateway
//!
//! A dataset is an identified, otherwise opaque JSON record. The controller
//! only ever looks at the id; views may dig into the remaining fields.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of a processed upload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Backends hand out either numeric or string ids.
impl<'de> Deserialize<'de> for DatasetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => DatasetId(text),
            RawId::Number(number) => DatasetId(number.to_string()),
        })
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DatasetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A dataset as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Backend identifier
    pub id: DatasetId,

    /// Every other field of the record, untouched
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Dataset {
    /// Field holding the parsed table rows
    pub const PARSED_ROWS_FIELD: &'static str = "raw_data_parsed";

    pub fn new(id: impl Into<DatasetId>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode a dataset from a JSON value
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Parsed table rows, if the backend sent them
    pub fn rows(&self) -> Option<&[Value]> {
        self.field(Self::PARSED_ROWS_FIELD)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Human readable name for headings and history entries
    pub fn display_name(&self) -> String {
        ["name", "file_name", "filename"]
            .iter()
            .find_map(|key| self.field(key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Dataset {}", self.id))
    }
}
