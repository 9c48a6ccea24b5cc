//! Records: the row-oriented input every chart consumes.
//!
//! Records are maps from column name to [`Value`]. Charts never mutate the
//! caller's records; preparation works on copies.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A numeric value.
    Number(f64),
    /// A text value.
    Text(String),
    /// A missing value.
    #[default]
    Null,
}

impl Value {
    /// Read the value as a number.
    ///
    /// Text that parses as a finite number counts as numeric, so `"12.5"` and
    /// `12.5` behave the same.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Value::Null => None,
        }
    }

    /// Get as string slice, only for text values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The value with numeric-looking text converted to [`Value::Number`].
    #[must_use]
    pub fn coerced(&self) -> Value {
        match self {
            Value::Text(_) => self.as_f64().map_or_else(|| self.clone(), Value::Number),
            _ => self.clone(),
        }
    }

    /// Whether the value is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text used for labels, ids and ordinal-scale keys.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Value::Text(s) => s.clone(),
            Value::Null => String::new(),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// One row of input data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.fields.insert(column.to_string(), value.into());
    }

    /// Get a field; missing fields read as `None`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Field as a number, see [`Value::as_f64`].
    #[must_use]
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    /// Field as a label, empty when missing.
    #[must_use]
    pub fn label(&self, column: &str) -> String {
        self.get(column).map(Value::label).unwrap_or_default()
    }

    /// Convert numeric-looking text in `column` to a number, in place.
    pub fn coerce(&mut self, column: &str) {
        if let Some(value) = self.fields.get_mut(column) {
            *value = value.coerced();
        }
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Natural ascending order: numbers before text, missing values last.
///
/// Numeric-looking text compares numerically; NaN sorts after every other
/// number.
#[must_use]
pub fn ascending(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.is_nan().cmp(&y.is_nan()).then_with(|| x.total_cmp(&y)),
        (Some(_), None) if !b.is_null() => Ordering::Less,
        (None, Some(_)) if !a.is_null() => Ordering::Greater,
        _ => match (a, b) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            _ => a.label().cmp(&b.label()),
        },
    }
}

/// Reverse of [`ascending`], still keeping missing values last.
#[must_use]
pub fn descending(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => ascending(b, a),
    }
}

/// Numeric values of `column`, skipping cells that are not numbers.
#[must_use]
pub fn numeric_column(records: &[Record], column: &str) -> Vec<f64> {
    records.iter().filter_map(|r| r.number(column)).collect()
}

/// `(min, max)` of the numeric cells of `column`, `None` when there are none.
#[must_use]
pub fn extent(records: &[Record], column: &str) -> Option<(f64, f64)> {
    records.iter().filter_map(|r| r.number(column)).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Distinct labels of `column` in first-seen order.
#[must_use]
pub fn distinct_labels(records: &[Record], column: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for label in records.iter().map(|r| r.label(column)) {
        if !seen.contains(&label) {
            seen.push(label);
        }
    }
    seen
}
