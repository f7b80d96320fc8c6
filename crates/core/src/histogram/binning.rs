/// Equal-width binning: maps `value` to a 1-based bucket index over
/// `[min, max]` split into `count` buckets.
///
/// Buckets are half-open except the last, which also holds `max`. Values
/// outside the range, non-finite values and an empty or inverted range give
/// `None`.
pub fn width_bucket(value: f64, min: f64, max: f64, count: u32) -> Option<i64> {
    if count == 0 || !value.is_finite() || !(min < max) {
        return None;
    }
    if value < min || value > max {
        return None;
    }
    let count = i64::from(count);
    let index = ((value - min) / (max - min) * count as f64).floor() as i64 + 1;
    Some(index.min(count))
}
