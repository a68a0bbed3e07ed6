use crate::error::AggregateError;
use crate::rollup::policy::NumericPolicy;
use crate::rollup::types::{IntervalSeries, RawValue, parse_timestamp};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Width of one interval: rows this far or further from the anchor start a new one.
pub const INTERVAL_SECONDS: i64 = 12 * 60 * 60;

/// Aggregates hourly rows into 12-hour intervals using [`NumericPolicy::default`].
pub fn aggregate_12h<S: AsRef<str>>(
    timestamps: &[S],
    fields: &BTreeMap<String, Vec<RawValue>>,
) -> Result<IntervalSeries, AggregateError> {
    aggregate(timestamps, fields, &NumericPolicy::default())
}

/// Aggregates hourly rows into 12-hour intervals.
///
/// Each interval is anchored on its first row and takes every following row
/// less than [`INTERVAL_SECONDS`] after that anchor. The anchor timestamp
/// labels the interval and each field is reduced to its mean, finished by
/// `policy`.
///
/// Rows past the end of the shortest series are ignored. Missing and empty
/// values count as `0.0`.
///
/// # Errors
///
/// Returns [`AggregateError::EmptyInput`] if `timestamps` or `fields` is
/// empty, and a parse error for the first malformed timestamp or value.
pub fn aggregate<S: AsRef<str>>(
    timestamps: &[S],
    fields: &BTreeMap<String, Vec<RawValue>>,
    policy: &NumericPolicy,
) -> Result<IntervalSeries, AggregateError> {
    if timestamps.is_empty() || fields.is_empty() {
        return Err(AggregateError::EmptyInput);
    }

    let names: Vec<&str> = fields.keys().map(String::as_str).collect();
    let series: Vec<&[RawValue]> = fields.values().map(Vec::as_slice).collect();
    let rows = series
        .iter()
        .map(|s| s.len())
        .fold(timestamps.len(), usize::min);

    let mut buckets = Buckets::new(names, policy);
    let mut values = vec![0.0; series.len()];

    for row in 0..rows {
        let raw_time = timestamps[row].as_ref();
        let current =
            parse_timestamp(raw_time).map_err(|source| AggregateError::MalformedTimestamp {
                row,
                value: raw_time.to_string(),
                source,
            })?;

        for (i, column) in series.iter().enumerate() {
            let raw = &column[row];
            values[i] = raw
                .coerce()
                .ok_or_else(|| AggregateError::MalformedNumericValue {
                    field: buckets.names[i].to_string(),
                    row,
                    value: raw.to_string(),
                })?;
        }

        buckets.observe(current, &values);
    }

    Ok(buckets.finish())
}

/// Running state of the open interval plus the columns emitted so far.
struct Buckets<'a> {
    names: Vec<&'a str>,
    policy: &'a NumericPolicy,
    anchor: Option<NaiveDateTime>,
    sums: Vec<f64>,
    counts: Vec<usize>,
    time: Vec<NaiveDateTime>,
    columns: Vec<Vec<f64>>,
}

impl<'a> Buckets<'a> {
    fn new(names: Vec<&'a str>, policy: &'a NumericPolicy) -> Self {
        let k = names.len();
        Self {
            names,
            policy,
            anchor: None,
            sums: vec![0.0; k],
            counts: vec![0; k],
            time: Vec::new(),
            columns: vec![Vec::new(); k],
        }
    }

    fn observe(&mut self, at: NaiveDateTime, values: &[f64]) {
        match self.anchor {
            Some(start) if (at - start).num_seconds() >= INTERVAL_SECONDS => {
                self.emit(start);
                self.open(at, values);
            }
            Some(_) => {
                for ((sum, count), v) in self.sums.iter_mut().zip(&mut self.counts).zip(values) {
                    *sum += v;
                    *count += 1;
                }
            }
            None => self.open(at, values),
        }
    }

    fn open(&mut self, at: NaiveDateTime, values: &[f64]) {
        self.anchor = Some(at);
        self.sums.copy_from_slice(values);
        self.counts.fill(1);
    }

    fn emit(&mut self, anchor: NaiveDateTime) {
        self.time.push(anchor);
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.push(self.policy.finish(self.names[i], self.sums[i], self.counts[i]));
        }
    }

    fn finish(mut self) -> IntervalSeries {
        // The trailing interval is kept only if every field has samples.
        if let Some(anchor) = self.anchor {
            if self.counts.iter().all(|&c| c > 0) {
                self.emit(anchor);
            }
        }

        IntervalSeries {
            time: self.time,
            fields: self
                .names
                .iter()
                .map(|name| name.to_string())
                .zip(self.columns)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::policy::Transform;
    use crate::rollup::types::format_timestamp;

    fn fields(entries: &[(&str, Vec<RawValue>)]) -> BTreeMap<String, Vec<RawValue>> {
        entries
            .iter()
            .map(|(name, values)| (name.to_string(), values.clone()))
            .collect()
    }

    fn nums(values: &[f64]) -> Vec<RawValue> {
        values.iter().copied().map(RawValue::from).collect()
    }

    fn times(series: &IntervalSeries) -> Vec<String> {
        series.time.iter().map(format_timestamp).collect()
    }

    /// `hours` hourly timestamps starting at 2024-01-01 00:00.
    fn hourly(hours: usize) -> Vec<String> {
        let start = parse_timestamp("2024-01-01 00:00").unwrap();
        (0..hours)
            .map(|h| format_timestamp(&(start + chrono::Duration::hours(h as i64))))
            .collect()
    }

    #[test]
    fn test_two_buckets_with_single_row_trailer() {
        let ts = ["2024-01-01 00:00", "2024-01-01 06:00", "2024-01-01 13:00"];
        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&[10.0, 20.0, 40.0]))])).unwrap();

        assert_eq!(times(&out), ["2024-01-01 00:00", "2024-01-01 13:00"]);
        assert_eq!(out.field("temp"), Some(&[15.0, 40.0][..]));
    }

    #[test]
    fn test_mean_rounds_on_stored_value() {
        // 2.23 / 2 is stored just below 1.115
        let ts = ["2024-01-01 00:00", "2024-01-01 01:00", "2024-01-01 12:00", "2024-01-01 13:00"];
        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&[2.23, 0.0, 9.33, 0.0]))])).unwrap();

        assert_eq!(out.field("temp"), Some(&[1.11, 4.67][..]));
    }

    #[test]
    fn test_rainspot_is_scaled() {
        let ts = ["2024-01-01 00:00", "2024-01-01 01:00"];
        let out = aggregate_12h(&ts, &fields(&[("rainspot", nums(&[1e47, 3e47]))])).unwrap();

        assert_eq!(times(&out), ["2024-01-01 00:00"]);
        assert_eq!(out.field("rainspot"), Some(&[2.0][..]));
    }

    #[test]
    fn test_rainspot_digit_strings() {
        let one = format!("1{}", "0".repeat(47));
        let three = format!("3{}", "0".repeat(47));
        let ts = ["2024-01-01 00:00", "2024-01-01 01:00"];
        let values = vec![RawValue::from(one.as_str()), RawValue::from(three.as_str())];

        let out = aggregate_12h(&ts, &fields(&[("rainspot", values)])).unwrap();
        assert_eq!(out.field("rainspot"), Some(&[2.0][..]));
    }

    #[test]
    fn test_empty_timestamps_is_error() {
        let ts: [&str; 0] = [];
        let err = aggregate_12h(&ts, &fields(&[("temp", nums(&[1.0]))])).unwrap_err();
        assert!(matches!(err, AggregateError::EmptyInput));
    }

    #[test]
    fn test_empty_fields_is_error() {
        let err = aggregate_12h(&["2024-01-01 00:00"], &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, AggregateError::EmptyInput));
    }

    #[test]
    fn test_both_empty_is_error() {
        let ts: [&str; 0] = [];
        let err = aggregate_12h(&ts, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, AggregateError::EmptyInput));
    }

    #[test]
    fn test_short_field_bounds_rows() {
        let ts = ["2024-01-01 00:00", "2024-01-01 06:00", "2024-01-01 13:00"];
        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&[10.0, 20.0]))])).unwrap();

        assert_eq!(times(&out), ["2024-01-01 00:00"]);
        assert_eq!(out.field("temp"), Some(&[15.0][..]));
    }

    #[test]
    fn test_short_timestamps_bound_rows() {
        let ts = ["2024-01-01 00:00"];
        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&[10.0, 99.0, 99.0]))])).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out.field("temp"), Some(&[10.0][..]));
    }

    #[test]
    fn test_missing_values_count_as_zero() {
        let ts = ["2024-01-01 00:00", "2024-01-01 01:00", "2024-01-01 02:00"];
        let values = vec![RawValue::from(9.0), RawValue::from(""), RawValue::Missing];

        let out = aggregate_12h(&ts, &fields(&[("precipitation", values)])).unwrap();
        assert_eq!(out.field("precipitation"), Some(&[3.0][..]));
    }

    #[test]
    fn test_malformed_value_is_error() {
        let ts = ["2024-01-01 00:00", "2024-01-01 01:00"];
        let values = vec![RawValue::from(1.0), RawValue::from("n/a")];

        let err = aggregate_12h(&ts, &fields(&[("temp", values)])).unwrap_err();
        match err {
            AggregateError::MalformedNumericValue { field, row, value } => {
                assert_eq!(field, "temp");
                assert_eq!(row, 1);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_timestamp_is_error() {
        let ts = ["2024-01-01 00:00", "01/01/2024 01:00"];
        let err = aggregate_12h(&ts, &fields(&[("temp", nums(&[1.0, 2.0]))])).unwrap_err();

        match err {
            AggregateError::MalformedTimestamp { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "01/01/2024 01:00");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rows_past_shortest_series_are_not_parsed() {
        let ts = ["2024-01-01 00:00", "garbage"];
        let values = vec![RawValue::from(1.0)];

        let out = aggregate_12h(&ts, &fields(&[("temp", values)])).unwrap();
        assert_eq!(out.field("temp"), Some(&[1.0][..]));
    }

    #[test]
    fn test_exact_twelve_hours_opens_new_bucket() {
        let ts = ["2024-01-01 00:00", "2024-01-01 11:59", "2024-01-01 12:00"];
        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&[1.0, 3.0, 7.0]))])).unwrap();

        assert_eq!(times(&out), ["2024-01-01 00:00", "2024-01-01 12:00"]);
        assert_eq!(out.field("temp"), Some(&[2.0, 7.0][..]));
    }

    #[test]
    fn test_anchor_is_not_calendar_aligned() {
        let ts = [
            "2024-01-01 05:00",
            "2024-01-01 12:00",
            "2024-01-01 17:00",
            "2024-01-02 04:00",
            "2024-01-02 05:30",
        ];
        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&[1.0, 2.0, 3.0, 4.0, 5.0]))]))
            .unwrap();

        assert_eq!(
            times(&out),
            ["2024-01-01 05:00", "2024-01-01 17:00", "2024-01-02 05:30"]
        );
        assert_eq!(out.field("temp"), Some(&[1.5, 3.5, 5.0][..]));
    }

    #[test]
    fn test_hourly_day_splits_into_twelve_row_buckets() {
        let ts = hourly(25);
        let values: Vec<f64> = (0..25).map(|h| h as f64).collect();

        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&values))])).unwrap();

        assert_eq!(
            times(&out),
            ["2024-01-01 00:00", "2024-01-01 12:00", "2024-01-02 00:00"]
        );
        // means of 0..=11, 12..=23, 24
        assert_eq!(out.field("temp"), Some(&[5.5, 17.5, 24.0][..]));
    }

    #[test]
    fn test_out_of_order_rows_accumulate() {
        let ts = ["2024-01-01 06:00", "2024-01-01 00:00", "2024-01-01 17:00"];
        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&[2.0, 4.0, 8.0]))])).unwrap();

        assert_eq!(times(&out), ["2024-01-01 06:00"]);
        assert_eq!(out.field("temp"), Some(&[4.67][..]));
    }

    #[test]
    fn test_every_field_has_one_value_per_interval() {
        let ts = hourly(40);
        let temp: Vec<f64> = (0..40).map(|h| 10.0 + h as f64).collect();
        let rain: Vec<RawValue> = (0..40)
            .map(|h| if h % 3 == 0 { RawValue::Missing } else { RawValue::from(0.5) })
            .collect();
        let input = fields(&[
            ("temperature", nums(&temp)),
            ("precipitation", rain),
            ("rainspot", nums(&[0.0; 40])),
        ]);

        let out = aggregate_12h(&ts, &input).unwrap();

        assert_eq!(out.len(), 4);
        assert_eq!(out.fields.len(), 3);
        for values in out.fields.values() {
            assert_eq!(values.len(), out.time.len());
        }
    }

    #[test]
    fn test_bucket_width_with_gaps() {
        let ts = [
            "2024-01-01 00:00",
            "2024-01-01 03:00",
            "2024-01-01 20:00",
            "2024-01-02 07:00",
            "2024-01-02 08:00",
            "2024-01-03 09:00",
        ];
        let out = aggregate_12h(&ts, &fields(&[("temp", nums(&[0.0; 6]))])).unwrap();

        assert_eq!(
            times(&out),
            ["2024-01-01 00:00", "2024-01-01 20:00", "2024-01-02 08:00", "2024-01-03 09:00"]
        );
        for pair in out.time.windows(2) {
            assert!((pair[1] - pair[0]).num_seconds() >= INTERVAL_SECONDS);
        }
    }

    #[test]
    fn test_fields_without_rows_give_empty_series() {
        let ts = ["2024-01-01 00:00"];
        let out = aggregate_12h(&ts, &fields(&[("temp", vec![]), ("rainspot", vec![])])).unwrap();

        assert!(out.is_empty());
        assert_eq!(out.field("temp"), Some(&[][..]));
        assert_eq!(out.field("rainspot"), Some(&[][..]));
    }

    #[test]
    fn test_custom_transform_is_applied() {
        let ts = ["2024-01-01 00:00", "2024-01-01 01:00"];
        let policy = NumericPolicy::default().with_transform("pressure", Transform::Divide(100.0));
        let input = fields(&[
            ("pressure", nums(&[101300.0, 101500.0])),
            ("rainspot", nums(&[2e47, 2e47])),
        ]);

        let out = aggregate(&ts, &input, &policy).unwrap();

        assert_eq!(out.field("pressure"), Some(&[1014.0][..]));
        assert_eq!(out.field("rainspot"), Some(&[2.0][..]));
    }

    #[test]
    fn test_identity_policy_leaves_rainspot_unscaled() {
        let ts = ["2024-01-01 00:00"];
        let out = aggregate(
            &ts,
            &fields(&[("rainspot", nums(&[12.346]))]),
            &NumericPolicy::identity(),
        )
        .unwrap();

        assert_eq!(out.field("rainspot"), Some(&[12.35][..]));
    }
}
