//! FILENAME: core/engine/src/value.rs
//! PURPOSE: Raw cell values as they arrive from a row source, and the display
//! values produced from them.
//! CONTEXT: Rows are opaque to the engine. A column's accessor pulls a `RawValue`
//! out of a row; the formatter turns it into a `DisplayValue`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::format::format_general;

/// A cell value exactly as the row source delivered it.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(from = "serde_json::Value")]
pub enum RawValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        RawValue::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Numeric view of the value, accepting numeric strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            RawValue::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        RawValue::from(&value)
    }
}

impl From<&serde_json::Value> for RawValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Text(b.to_string()),
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            Value::String(s) => RawValue::Text(s.clone()),
            other => RawValue::Text(other.to_string()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<usize> for RawValue {
    fn from(value: usize) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Null)
    }
}

impl From<DisplayValue> for RawValue {
    fn from(value: DisplayValue) -> Self {
        match value {
            DisplayValue::Number(n) => RawValue::Number(n),
            DisplayValue::Text(s) => RawValue::Text(s),
        }
    }
}

/// Raw values print the way the source sent them: no placeholder, no rounding.
impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Number(n) => f.write_str(&format_general(*n)),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// A display-ready value. Renderers decide currency/percent presentation of numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Number(f64),
    Text(String),
}

impl DisplayValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DisplayValue::Number(n) => Some(*n),
            DisplayValue::Text(_) => None,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => f.write_str(&format_general(*n)),
            DisplayValue::Text(s) => f.write_str(s),
        }
    }
}

/// Schema-agnostic row: whatever keys the backend returned.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, RawValue>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, `Null` when absent.
    pub fn get(&self, key: &str) -> RawValue {
        self.0.get(key).cloned().unwrap_or(RawValue::Null)
    }

    pub fn get_ref(&self, key: &str) -> Option<&RawValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses a JSON array of objects into records.
    pub fn many_from_json(json: &str) -> Result<Vec<Record>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
