//! Shared primitive types used across the desk.

/// A stable, unique identifier for any stored record.
pub type RecordId = String;

/// Identifier of a roster member. Static reference data, never generated.
pub type StaffId = String;

/// A whole-number percentage in [0, 100] as shown on the dashboard.
pub type Percent = u32;

/// Generate a fresh record identifier.
pub fn new_record_id() -> RecordId {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Round half up, matching how the dashboard has always displayed
/// percentages (2.5 -> 3, -2.5 -> -2).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Round a non-negative average to a dashboard percentage.
/// Negative or non-finite inputs collapse to 0.
pub fn to_percent(value: f64) -> Percent {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    round_half_up(value) as Percent
}

/// `numerator / denominator`, or 0 when the denominator is zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Arithmetic mean, or `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
