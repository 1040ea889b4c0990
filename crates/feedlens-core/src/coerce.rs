//! Lenient value coercion for untrusted upstream JSON.
//!
//! The upstream API is undocumented and its field types drift: counts arrive
//! as numbers or numeric strings, flags as booleans or 0/1, and whole objects
//! occasionally come back as `null`. These helpers are used as
//! `deserialize_with` targets so that a surprising type degrades to "absent"
//! instead of failing the whole payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Truthiness as the upstream's web client sees it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric interpretation of a JSON value.
///
/// `null` and the empty string read as zero, booleans as 0/1, and strings
/// are parsed after trimming. Anything that does not yield a finite number
/// returns `None`.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Clamp an optional number to a non-negative integer count, defaulting to 0.
pub fn count(value: Option<f64>) -> u64 {
    value
        .filter(|f| f.is_finite() && *f > 0.0)
        .map(|f| f.trunc() as u64)
        .unwrap_or(0)
}

/// Like [`count`], but zero and absence both map to `None`.
pub fn nonzero_count(value: Option<f64>) -> Option<u64> {
    Some(count(value)).filter(|c| *c > 0)
}

/// A numeric field that remembers whether it was sent at all.
///
/// Fallback chains only move on to the next field when this one is
/// [`Numeric::Missing`]; a present but unparseable value stops the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Numeric {
    /// Absent or `null`.
    #[default]
    Missing,
    /// Present but not a number.
    Invalid,
    Value(f64),
}

impl Numeric {
    /// This value, or `fallback` when the field was missing.
    pub fn or(self, fallback: Option<f64>) -> Option<f64> {
        match self {
            Self::Missing => fallback,
            Self::Invalid => None,
            Self::Value(v) => Some(v),
        }
    }
}

/// Render a number for output: integral values as JSON integers, anything
/// else as a float. Non-finite values have no JSON form.
pub fn json_number(value: f64) -> Option<serde_json::Number> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Some(serde_json::Number::from(value as i64))
    } else {
        serde_json::Number::from_f64(value)
    }
}

/// Deserialize any value as an optional number. `null` is treated as absent.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => to_number(&other),
    })
}

/// Deserialize any value as a [`Numeric`], keeping absent and invalid apart.
pub fn numeric<'de, D>(deserializer: D) -> Result<Numeric, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => Numeric::Missing,
        other => to_number(&other).map_or(Numeric::Invalid, Numeric::Value),
    })
}

/// Deserialize any value as an optional string. Numbers are stringified.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Deserialize any value as a boolean by truthiness.
pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

/// Deserialize a nested structure, yielding `None` if it has the wrong shape.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize a list leniently: a non-array yields an empty list and
/// malformed elements fall back to their default.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}
