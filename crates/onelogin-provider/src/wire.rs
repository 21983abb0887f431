//! Deserialization helpers for API payloads.
//!
//! The OneLogin API is not consistent about number and identifier encoding:
//! depending on the endpoint generation integers come back as floats or
//! strings, and IDs as numbers or strings. These helpers normalise that once,
//! at decode time, so the models and their flatteners deal with one shape.
//!
//! Use them with `#[serde(default, deserialize_with = "...")]`.

use indexmap::IndexMap;
use onelogin_core::Setting;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_i32(value: &Value) -> Option<i32> {
    to_i64(value).and_then(|n| i32::try_from(n).ok())
}

/// Integer field tolerant of float and numeric-string encodings.
/// Null and the empty string are unset.
pub fn int32<'de, D>(deserializer: D) -> Result<Setting<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Setting::Unset),
        Some(Value::String(s)) if s.is_empty() => Ok(Setting::Unset),
        Some(value) => to_i32(&value)
            .map(Setting::Set)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}"))),
    }
}

/// Identifier that may be a number or a string, kept as a string
pub fn id<'de, D>(deserializer: D) -> Result<Setting<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Setting::Unset),
        Some(Value::String(s)) if s.is_empty() => Ok(Setting::Unset),
        Some(Value::String(s)) => Ok(Setting::Set(s)),
        Some(value) => to_i64(&value)
            .map(|n| Setting::Set(n.to_string()))
            .ok_or_else(|| D::Error::custom(format!("expected an identifier, got {value}"))),
    }
}

/// Writes a numeric identifier as an integer, anything else unchanged
pub fn numeric_id<S>(id: &Setting<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id.get().and_then(|s| s.parse::<i64>().ok()) {
        Some(n) => serializer.serialize_i64(n),
        None => id.serialize(serializer),
    }
}

/// List of integers; null or absent becomes empty
pub fn int32_list<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    items
        .iter()
        .map(|item| {
            to_i32(item).ok_or_else(|| D::Error::custom(format!("expected an integer, got {item}")))
        })
        .collect()
}

/// Like [`int32_list`], keeping null apart from an empty list
pub fn int32_list_setting<'de, D>(deserializer: D) -> Result<Setting<Vec<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Vec<Value>>::deserialize(deserializer)? {
        None => Ok(Setting::Unset),
        Some(items) => items
            .iter()
            .map(|item| {
                to_i32(item)
                    .ok_or_else(|| D::Error::custom(format!("expected an integer, got {item}")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Setting::Set),
    }
}

/// String field that the API sometimes returns as a number or flag
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Setting<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Setting::Unset,
        Some(Value::String(s)) => Setting::Set(s),
        Some(Value::Number(n)) => Setting::Set(n.to_string()),
        Some(Value::Bool(b)) => Setting::Set(b.to_string()),
        Some(other) => Setting::Set(other.to_string()),
    })
}

/// List of strings whose items may arrive as numbers
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .filter(|item| !item.is_null())
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

/// Map of strings; null entries are dropped and scalars stringified
pub fn string_map<'de, D>(deserializer: D) -> Result<Setting<IndexMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(map) = Option::<IndexMap<String, Value>>::deserialize(deserializer)? else {
        return Ok(Setting::Unset);
    };
    Ok(Setting::Set(
        map.into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect(),
    ))
}

/// List of objects; null becomes empty
pub fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Boolean that may arrive as `0`/`1` or `"true"`/`"false"`
pub fn flag<'de, D>(deserializer: D) -> Result<Setting<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Setting::Unset),
        Some(Value::Bool(b)) => Ok(Setting::Set(b)),
        Some(Value::String(s)) if s == "true" || s == "1" => Ok(Setting::Set(true)),
        Some(Value::String(s)) if s == "false" || s == "0" => Ok(Setting::Set(false)),
        Some(value) => match to_i64(&value) {
            Some(n) => Ok(Setting::Set(n != 0)),
            None => Err(D::Error::custom(format!("expected a boolean, got {value}"))),
        },
    }
}
