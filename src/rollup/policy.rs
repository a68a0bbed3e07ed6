use crate::rollup::utility::{DECIMALS, mean, round_to};
use std::collections::HashMap;

/// Field whose upstream encoding is offset by 47 orders of magnitude.
pub const RAINSPOT_FIELD: &str = "rainspot";

/// Divisor that brings `rainspot` means back into range.
pub const RAINSPOT_DIVISOR: f64 = 1e47;

/// Correction applied to a field's mean before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Identity,
    Divide(f64),
}

impl Transform {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Transform::Identity => value,
            Transform::Divide(divisor) => value / divisor,
        }
    }
}

/// Maps field names to the [`Transform`] applied when an interval is emitted.
///
/// Fields without an entry use [`Transform::Identity`]. Every emitted value
/// is rounded to two decimal places after the transform.
///
/// | Field      | Transform      |
/// |------------|----------------|
/// | `rainspot` | `Divide(1e47)` |
/// | others     | `Identity`     |
#[derive(Debug, Clone)]
pub struct NumericPolicy {
    transforms: HashMap<String, Transform>,
}

impl Default for NumericPolicy {
    fn default() -> Self {
        Self::identity().with_transform(RAINSPOT_FIELD, Transform::Divide(RAINSPOT_DIVISOR))
    }
}

impl NumericPolicy {
    /// A policy that only rounds.
    pub fn identity() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Registers (or replaces) the transform for `field`.
    pub fn with_transform(mut self, field: impl Into<String>, transform: Transform) -> Self {
        self.transforms.insert(field.into(), transform);
        self
    }

    pub fn transform_for(&self, field: &str) -> Transform {
        self.transforms
            .get(field)
            .copied()
            .unwrap_or(Transform::Identity)
    }

    /// Produces the emitted value for `field` from its running sum and count.
    ///
    /// A field with no samples is emitted as `0.0`, whatever its transform.
    pub fn finish(&self, field: &str, sum: f64, count: usize) -> f64 {
        match mean(sum, count) {
            Some(m) => round_to(self.transform_for(field).apply(m), DECIMALS),
            None => 0.0,
        }
    }
}
