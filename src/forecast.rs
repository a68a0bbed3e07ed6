//! JSON decoder for meteoblue `basic-1h_basic-day` forecast documents.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::AggregateError;
use crate::rollup::{IntervalSeries, NumericPolicy, RawValue, aggregate};

/// The parts of an upstream forecast document this crate uses.
#[derive(Debug, Default, Deserialize)]
pub struct Forecast {
    /// Hourly series, reduced to 12-hour intervals.
    #[serde(default)]
    pub data_1h: HourlyBlock,
    /// Daily series, passed through untouched.
    #[serde(default = "empty_object")]
    pub data_day: Value,
}

/// Hourly block: a `time` column plus one array per measured field.
///
/// `time` entries are kept as raw JSON so a non-string entry is reported by
/// the aggregator as a malformed timestamp rather than failing the decode.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HourlyBlock {
    #[serde(default)]
    pub time: Vec<Value>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Vec<RawValue>>,
}

impl HourlyBlock {
    pub fn aggregate(&self, policy: &NumericPolicy) -> Result<IntervalSeries, AggregateError> {
        let time: Vec<Cow<'_, str>> = self
            .time
            .iter()
            .map(|t| match t {
                Value::String(s) => Cow::Borrowed(s.as_str()),
                other => Cow::Owned(other.to_string()),
            })
            .collect();
        aggregate(time.as_slice(), &self.fields, policy)
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Decodes a forecast document from raw response bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON, or if `data_1h` holds a
/// non-array field.
pub fn parse_forecast(bytes: &[u8]) -> Result<Forecast> {
    serde_json::from_slice(bytes).context("response is not a valid forecast document")
}
