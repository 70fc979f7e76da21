//! Summation helpers shared by the analysis modules.
//!
//! - **Mean**: Kahan compensated summation for O(ε) error independent of n.
//!   Reference: Kahan (1965), "Further remarks on reducing truncation
//!   errors", *Communications of the ACM* 8(1).

/// Kahan compensated sum.
pub(crate) fn kahan_sum(data: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut comp = 0.0;
    for x in data {
        let y = x - comp;
        let t = sum + y;
        comp = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Arithmetic mean, or `0.0` for an empty slice.
pub(crate) fn mean_or_zero(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    kahan_sum(data.iter().copied()) / data.len() as f64
}
