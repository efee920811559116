//! Records: flat, ordered key-value objects read from and written to JSON
//!
//! A record file is a JSON array of objects. Field order is kept exactly as
//! read so that a translated file diffs cleanly against its source.
//!
//! ```ignore
//! use record_mt::record::{parse_records, to_pretty_json};
//!
//! let records = parse_records(r#"[{"name": "salam", "id": 7}]"#)?;
//! assert_eq!(records[0].get("name").and_then(|v| v.as_source_text()), Some("salam".into()));
//! println!("{}", to_pretty_json(&records)?);
//! ```

use crate::error::{BatchError, BatchResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single field value
///
/// Serialized untagged, so JSON in and JSON out look the same. The variants
/// only exist to make the translatable cases explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON `null`
    Null,
    /// Never translated, even when `true`; see [`FieldValue::as_source_text`]
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    /// Arrays and objects are carried through untouched
    Nested(serde_json::Value),
}

impl FieldValue {
    /// Truthiness as the record selector sees it
    ///
    /// Empty text, zero and null are falsy. Everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Nested(_) => true,
        }
    }

    /// The text to send for translation, if this value can be translated
    ///
    /// Numbers are sent using their JSON rendering. Booleans and nested
    /// values are never translated.
    pub fn as_source_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Null | FieldValue::Bool(_) | FieldValue::Nested(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

/// One flat object from the input collection
///
/// Identity is the record's position in its collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, FieldValue>);

impl Record {
    pub fn new() -> Self {
        Record(IndexMap::new())
    }

    /// Builder-style insert, handy for tests and fixtures
    pub fn with(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Set a field; an existing key keeps its position, a new one is appended
    pub fn insert(&mut self, key: &str, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(key.to_string(), value)
    }

    /// Remove a field, keeping the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a record file: a JSON array of flat objects
pub fn parse_records(input: &str) -> BatchResult<Vec<Record>> {
    serde_json::from_str(input).map_err(|e| BatchError::Parse(e.to_string()))
}

/// Serialize records as pretty-printed JSON (two-space indent)
pub fn to_pretty_json(records: &[Record]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
