//! Data types used by the rollup pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Textual pattern of input and output timestamps.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT)
}

pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// A single cell of an hourly field series, as delivered upstream.
///
/// Numbers may arrive as JSON numbers or as decimal strings. `null` and the
/// empty string both mean "no reading". Booleans read as `1.0` / `0.0`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum RawValue {
    Missing,
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Returns the numeric reading, `0.0` for a missing one, or `None` if the
    /// value is not a decimal number.
    pub fn coerce(&self) -> Option<f64> {
        match self {
            RawValue::Missing => Some(0.0),
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) if s.is_empty() => Some(0.0),
            RawValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Missing,
            Value::Number(n) => match n.as_f64() {
                Some(f) => RawValue::Number(f),
                None => RawValue::Text(n.to_string()),
            },
            Value::String(s) => RawValue::Text(s),
            Value::Bool(b) => RawValue::Number(if b { 1.0 } else { 0.0 }),
            other => RawValue::Text(other.to_string()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Missing, RawValue::Number)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Missing => Ok(()),
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// The 12-hour table: bucket anchor timestamps plus one value column per field.
///
/// Serializes as a flat object, `{"time": [...], "<field>": [...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalSeries {
    #[serde(with = "minute_list")]
    pub time: Vec<NaiveDateTime>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Vec<f64>>,
}

impl IntervalSeries {
    /// Number of emitted intervals.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[f64]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// Converts the table into a JSON object keyed by `time` and field names.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert(
            "time".to_string(),
            Value::from(self.time.iter().map(format_timestamp).collect::<Vec<_>>()),
        );
        for (name, values) in &self.fields {
            doc.insert(name.clone(), Value::from(values.clone()));
        }
        doc
    }
}

mod minute_list {
    use super::{TIME_FORMAT, format_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(times: &[NaiveDateTime], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(times.iter().map(format_timestamp))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NaiveDateTime>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|s| NaiveDateTime::parse_from_str(s, TIME_FORMAT).map_err(D::Error::custom))
            .collect()
    }
}
