//! Configuration and state records.
//!
//! A [`Record`] is the string-keyed value map exchanged with the host
//! framework. Reading it goes through typed accessors that return
//! `Result<Option<T>, DecodeError>`: `Ok(None)` means the key is absent (or
//! null), a value of the wrong kind is an error naming the field. Absence is
//! never conflated with a zero value here; elision is the mapping's call.

use indexmap::IndexMap;
use onelogin_core::{Setting, parse_id_lenient};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A configuration value of the wrong shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{field}: expected {expected}, got {found}")]
    Type {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{field}: {value} does not fit in a 32-bit integer")]
    OutOfRange { field: String, value: i64 },

    #[error("{field} is required")]
    Missing { field: String },
}

impl DecodeError {
    fn type_mismatch(field: String, expected: &'static str, found: &Value) -> Self {
        Self::Type {
            field,
            expected,
            found: kind_name(found),
        }
    }
}

/// Name of a JSON value's kind, as used in decode errors
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "block",
    }
}

type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: IndexMap<String, Value>,
    /// Location of this record inside its parent, for error messages
    #[serde(skip)]
    path: String,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object.
    pub fn from_value(value: Value) -> DecodeResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(DecodeError::type_mismatch(
                "<root>".to_string(),
                "block",
                &other,
            )),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            values: map.into_iter().collect(),
            path: String::new(),
        }
    }

    fn nested(map: Map<String, Value>, path: String) -> Self {
        Self {
            values: map.into_iter().collect(),
            path,
        }
    }

    /// Full path of `key` for error messages, e.g. `conditions.0.source`
    pub fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    /// Raw value of `key`; null counts as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn string(&self, key: &str) -> DecodeResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(DecodeError::type_mismatch(
                self.path_of(key),
                "string",
                other,
            )),
        }
    }

    /// Integer value; integral floats are accepted since JSON decoders
    /// upstream may not preserve the distinction.
    pub fn int(&self, key: &str) -> DecodeResult<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => as_int(value)
                .map(Some)
                .ok_or_else(|| DecodeError::type_mismatch(self.path_of(key), "int", value)),
        }
    }

    pub fn int32(&self, key: &str) -> DecodeResult<Option<i32>> {
        match self.int(key)? {
            None => Ok(None),
            Some(n) => i32::try_from(n).map(Some).map_err(|_| DecodeError::OutOfRange {
                field: self.path_of(key),
                value: n,
            }),
        }
    }

    /// Numeric identifier; a value that does not parse is ignored.
    pub fn lenient_id(&self, key: &str) -> DecodeResult<Option<i32>> {
        Ok(self.string(key)?.as_deref().and_then(parse_id_lenient))
    }

    pub fn bool(&self, key: &str) -> DecodeResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(DecodeError::type_mismatch(self.path_of(key), "bool", other)),
        }
    }

    fn list(&self, key: &str) -> DecodeResult<Option<&Vec<Value>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(DecodeError::type_mismatch(self.path_of(key), "list", other)),
        }
    }

    pub fn string_list(&self, key: &str) -> DecodeResult<Option<Vec<String>>> {
        let Some(items) = self.list(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(DecodeError::type_mismatch(
                    format!("{}.{i}", self.path_of(key)),
                    "string",
                    other,
                )),
            })
            .collect::<DecodeResult<Vec<_>>>()
            .map(Some)
    }

    pub fn int_list(&self, key: &str) -> DecodeResult<Option<Vec<i32>>> {
        let Some(items) = self.list(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let field = format!("{}.{i}", self.path_of(key));
                let n = as_int(item)
                    .ok_or_else(|| DecodeError::type_mismatch(field.clone(), "int", item))?;
                i32::try_from(n).map_err(|_| DecodeError::OutOfRange { field, value: n })
            })
            .collect::<DecodeResult<Vec<_>>>()
            .map(Some)
    }

    /// Map attribute with arbitrary JSON values
    pub fn object(&self, key: &str) -> DecodeResult<Option<Map<String, Value>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(other) => Err(DecodeError::type_mismatch(self.path_of(key), "map", other)),
        }
    }

    /// Map attribute whose values must be strings
    pub fn string_map(&self, key: &str) -> DecodeResult<Option<IndexMap<String, String>>> {
        let Some(map) = self.object(key)? else {
            return Ok(None);
        };
        map.into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k, s)),
                other => Err(DecodeError::type_mismatch(
                    format!("{}.{k}", self.path_of(key)),
                    "string",
                    &other,
                )),
            })
            .collect::<DecodeResult<IndexMap<_, _>>>()
            .map(Some)
    }

    /// Nested block instances.
    ///
    /// Accepts a list of objects, or a single object for single-instance
    /// blocks. Absent yields an empty list.
    pub fn blocks(&self, key: &str) -> DecodeResult<Vec<Record>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Object(map)) => Ok(vec![Record::nested(map.clone(), self.path_of(key))]),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let path = format!("{}.{i}", self.path_of(key));
                    match item {
                        Value::Object(map) => Ok(Record::nested(map.clone(), path)),
                        other => Err(DecodeError::type_mismatch(path, "block", other)),
                    }
                })
                .collect(),
            Some(other) => Err(DecodeError::type_mismatch(self.path_of(key), "block", other)),
        }
    }

    /// First instance of a single-instance block
    pub fn block(&self, key: &str) -> DecodeResult<Option<Record>> {
        Ok(self.blocks(key)?.into_iter().next())
    }

    pub fn require_string(&self, key: &str) -> DecodeResult<String> {
        self.string(key)?.ok_or_else(|| DecodeError::Missing {
            field: self.path_of(key),
        })
    }

    pub fn require_int32(&self, key: &str) -> DecodeResult<i32> {
        self.int32(key)?.ok_or_else(|| DecodeError::Missing {
            field: self.path_of(key),
        })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Inserts the value only when it is set.
    pub fn set<T>(&mut self, key: &str, value: &Setting<T>)
    where
        T: Clone + Into<Value>,
    {
        if let Setting::Set(value) = value {
            self.values.insert(key.to_string(), value.clone().into());
        }
    }

    pub fn insert_blocks(&mut self, key: impl Into<String>, blocks: Vec<Record>) {
        let items = blocks.into_iter().map(Record::into_value).collect();
        self.values.insert(key.into(), Value::Array(items));
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values.into_iter().collect())
    }

    pub fn to_value(&self) -> Value {
        self.clone().into_value()
    }
}

/// Integer view of a number, accepting integral floats
pub(crate) fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}
