/// Number of decimal places kept in emitted interval values.
pub const DECIMALS: i32 = 2;

/// Computes a mean from a running sum and sample count. Returns `None` when
/// no samples were accumulated.
pub fn mean(sum: f64, count: usize) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// Rounds `value` to `decimals` places based on its exact binary value.
///
/// `1.115` is stored just below the half and rounds down. Exact halves such
/// as `0.125` round to even. Non-finite values and values too large to scale
/// are returned unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !(value * 10f64.powi(decimals)).is_finite() {
        return value;
    }
    format!("{:.*}", decimals.max(0) as usize, value)
        .parse()
        .unwrap_or(value)
}
