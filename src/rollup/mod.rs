//! Hourly-to-12-hour rollup of weather series.
//!
//! This module buckets an hourly table into fixed 12-hour intervals anchored
//! on the first row of each interval, averages every field per interval, and
//! applies a per-field numeric policy (scaling and rounding) to the means.

pub mod aggregate;
pub mod policy;
pub mod types;
pub mod utility;

pub use aggregate::{INTERVAL_SECONDS, aggregate, aggregate_12h};
pub use policy::{NumericPolicy, Transform};
pub use types::{IntervalSeries, RawValue};
