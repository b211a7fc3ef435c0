pub mod interp;
pub mod parser;
pub mod stft;
use crate::consts::{LOG_TWO, LOG_ZERO};
/// Natural logarithm floored at `LOG_ZERO` for non-positive input.
#[inline(always)]
pub fn floor_log(x: f64) -> f64 {
    if x <= 0.0 { LOG_ZERO } else { x.ln() }
}
/// Computes `ln(e^x + e^y)` without leaving log space.
pub fn add_in_log_space(log_x: f64, log_y: f64) -> f64 {
    if log_x == log_y {
        return log_x + LOG_TWO;
    }
    let (smaller, greater) = if log_x < log_y { (log_x, log_y) } else { (log_y, log_x) };
    let diff = smaller - greater;
    // exp(diff) vanishes below machine epsilon
    let threshold = f64::EPSILON.ln();
    if diff < threshold {
        return greater;
    }
    greater + diff.exp().ln_1p()
}
/// Log-sum-exp over a slice, `LOG_ZERO` when empty.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    values.iter().skip(1).fold(
        values.first().copied().unwrap_or(LOG_ZERO),
        |acc, &v| add_in_log_space(acc, v),
    )
}
