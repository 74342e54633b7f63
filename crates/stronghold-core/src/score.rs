/// Triangular fitness score of `value` against `target`, in `[0, 100]`.
///
/// Peaks at 100 when `value == target` and falls off linearly to 0 at
/// `value == 0` and `value == 2 * target`. `target` must be positive.
#[inline]
pub fn score_distance_from_target(target: f64, value: f64) -> f64 {
    let ratio = (target - (target - value).abs()) / target;
    (ratio * 100.0).min(100.0).max(0.0)
}
