//! Lenient field decoders for persisted records.
//!
//! Stored payloads may come from older app versions or be partially
//! corrupt. Each field decodes on its own: a value that is not a finite
//! number falls back to the field default, and numbers outside the
//! field's range are clamped. Combined with `#[serde(default)]` this turns
//! any JSON object into a fully populated record in one pass.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Highest star rating for any skill or game
pub const MAX_STARS: u8 = 3;

/// Upper bound of percentage fields
pub const MAX_PERCENT: u8 = 100;

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

pub(crate) fn clamp_stars(n: f64) -> u8 {
    n.floor().clamp(0.0, MAX_STARS as f64) as u8
}

pub(crate) fn clamp_percent(n: f64) -> u8 {
    if !n.is_finite() {
        return 0;
    }
    n.round().clamp(0.0, MAX_PERCENT as f64) as u8
}

pub(crate) fn clamp_counter(n: f64) -> u64 {
    // float-to-int `as` saturates at u64::MAX
    n.floor().max(0.0) as u64
}

pub(crate) fn stars<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(finite(&value).map(clamp_stars).unwrap_or(0))
}

pub(crate) fn percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(finite(&value).map(clamp_percent).unwrap_or(0))
}

pub(crate) fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(finite(&value).map(clamp_counter).unwrap_or(0))
}

pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(finite(&value).map(|n| n as i64).unwrap_or(0))
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

/// Decode a list, dropping elements that do not decode.
/// A non-array value yields an empty list.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Parse a payload that must be a JSON object.
///
/// Returns `None` for invalid JSON and for valid JSON that is not an
/// object (a bare number, an array, `null`).
pub(crate) fn decode_object<T>(raw: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    let value: Value = serde_json::from_str(raw).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}
