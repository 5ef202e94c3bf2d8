//! FILENAME: core/records/src/row.rs
//! PURPOSE: One immutable record of the backing dataset.
//! CONTEXT: Records are fetched by the caller and handed over as a snapshot.
//! A record is identified by its `id` field, or by its position in the
//! snapshot when that field is missing.

use crate::error::RecordsError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Field name that carries the caller-supplied record identifier.
pub const ID_FIELD: &str = "id";

static EMPTY: Value = Value::Empty;

/// Stable identifier of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raw record: a mapping from field name to value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    id: RowId,
    fields: HashMap<String, Value>,
}

impl Row {
    /// Builds a record from field pairs. `position` is the index of the record
    /// in its snapshot and becomes the id when no non-empty `id` field exists.
    pub fn from_pairs<K, V, I>(position: usize, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let fields: HashMap<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let id = match fields.get(ID_FIELD) {
            Some(v) if !v.is_empty() => RowId(v.to_string()),
            _ => RowId(position.to_string()),
        };
        Row { id, fields }
    }

    /// Builds a record from a JSON object.
    pub fn from_json(position: usize, json: &serde_json::Value) -> Result<Self, RecordsError> {
        let object = json.as_object().ok_or_else(|| RecordsError::InvalidRecord {
            position,
            reason: format!("expected a JSON object, found {}", json_kind(json)),
        })?;

        Ok(Row::from_pairs(
            position,
            object.iter().map(|(k, v)| (k.clone(), Value::from_json(v))),
        ))
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Returns the value of a field, or `Value::Empty` if the field is absent.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// Ingests a JSON array of objects into a record snapshot.
pub fn rows_from_json(json: &serde_json::Value) -> Result<Vec<Row>, RecordsError> {
    let items = json.as_array().ok_or_else(|| RecordsError::InvalidRecord {
        position: 0,
        reason: format!("expected a JSON array of records, found {}", json_kind(json)),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(position, item)| Row::from_json(position, item))
        .collect()
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
