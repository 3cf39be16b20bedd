//! The document passed through the enrichment pipeline.
//!
//! A document is an ordered JSON object. Fields are addressed by name, and a
//! dotted name (`meta.body`) traverses nested objects. A key that exists
//! verbatim at the top level (`"meta.body"` itself) wins over traversal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised when reading or writing document fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("cannot write `{path}`: `{segment}` is not an object")]
    NotTraversable { path: String, segment: String },

    #[error("field name is empty")]
    EmptyPath,
}

/// Mutable field bag owned by one pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; only objects are documents.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(DocumentError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name or dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(path) {
            return Some(value);
        }
        if !path.contains('.') {
            return None;
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Whether the field holds a value. `null` counts as absent.
    pub fn has_field(&self, path: &str) -> bool {
        matches!(self.get(path), Some(v) if !v.is_null())
    }

    /// Write a field, creating intermediate objects along a dotted path.
    ///
    /// An existing top-level key equal to the full path is overwritten in
    /// place rather than traversed.
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), DocumentError> {
        if path.is_empty() {
            return Err(DocumentError::EmptyPath);
        }
        if !path.contains('.') || self.fields.contains_key(path) {
            self.fields.insert(path.to_string(), value);
            return Ok(());
        }

        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(DocumentError::EmptyPath);
        }
        let (last, parents) = segments
            .split_last()
            .ok_or(DocumentError::EmptyPath)?;

        let mut current = &mut self.fields;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if entry.is_null() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => {
                    return Err(DocumentError::NotTraversable {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
        }
        current.insert(last.to_string(), value);
        Ok(())
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
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
