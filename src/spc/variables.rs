//! Variables control charts: X-bar-R limits from a flat measurement series.
//!
//! # Control Chart Factors
//!
//! A2, D3 and D4 are sourced from ASTM E2587 — Standard Practice for Use of
//! Control Charts in Statistical Process Control, for subgroup sizes 2..=10.
//! Sizes outside the table are resolved by an explicit [`A2Fallback`] policy.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts
//! - Shewhart, W.A. (1931). *Economic Control of Quality of Manufactured Product*.

use super::chart::ControlLimits;
use crate::error::{ensure_finite, QcError, Result};
use crate::stats::mean_or_zero;

// ---------------------------------------------------------------------------
// Control chart factor tables (ASTM E2587), indexed by subgroup size n=2..10
// Index 0 corresponds to n=2.
// ---------------------------------------------------------------------------

/// Smallest tabulated subgroup size.
const MIN_TABULATED: usize = 2;

/// Largest tabulated subgroup size.
const MAX_TABULATED: usize = 10;

/// A2 factors for X-bar chart UCL/LCL computation.
///
/// UCL = X-double-bar + A2 * R-bar, LCL = X-double-bar - A2 * R-bar.
const A2: [f64; 9] = [1.880, 1.023, 0.729, 0.577, 0.483, 0.419, 0.373, 0.337, 0.308];

/// D3 factors for R chart lower control limit.
const D3: [f64; 9] = [0.0, 0.0, 0.0, 0.0, 0.0, 0.076, 0.136, 0.184, 0.223];

/// D4 factors for R chart upper control limit.
const D4: [f64; 9] = [3.267, 2.575, 2.282, 2.114, 2.004, 1.924, 1.864, 1.816, 1.777];

/// How a subgroup size outside the 2..=10 factor table is resolved.
///
/// Both policies are approximations: the factors are only exact for the
/// tabulated sizes. The chosen factor and whether it was tabulated are
/// reported on [`XBarRLimits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum A2Fallback {
    /// Use the n = 5 factors (A2 = 0.577) for every untabulated size.
    #[default]
    SubgroupFive,
    /// Clamp the size into 2..=10 and use the nearest tabulated factors.
    NearestTabulated,
}

impl A2Fallback {
    /// Factor table index for `subgroup_size`, and whether it was tabulated.
    fn table_index(self, subgroup_size: usize) -> (usize, bool) {
        if (MIN_TABULATED..=MAX_TABULATED).contains(&subgroup_size) {
            return (subgroup_size - MIN_TABULATED, true);
        }
        let n = match self {
            Self::SubgroupFive => 5,
            Self::NearestTabulated => subgroup_size.clamp(MIN_TABULATED, MAX_TABULATED),
        };
        (n - MIN_TABULATED, false)
    }
}

/// Looks up the A2 factor for `subgroup_size`.
///
/// Returns the factor and `true` when it came straight from the table,
/// `false` when `fallback` supplied it.
///
/// # Examples
///
/// ```
/// use u_quality::spc::{a2_factor, A2Fallback};
///
/// assert_eq!(a2_factor(5, A2Fallback::SubgroupFive), (0.577, true));
/// assert_eq!(a2_factor(25, A2Fallback::SubgroupFive), (0.577, false));
/// assert_eq!(a2_factor(25, A2Fallback::NearestTabulated), (0.308, false));
/// ```
pub fn a2_factor(subgroup_size: usize, fallback: A2Fallback) -> (f64, bool) {
    let (idx, tabulated) = fallback.table_index(subgroup_size);
    (A2[idx], tabulated)
}

/// X-bar and R chart limits computed from consecutive subgroups.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XBarRLimits {
    /// X-bar chart limits: CL = X-double-bar, UCL/LCL = CL ± A2·R-bar.
    pub xbar: ControlLimits,
    /// R chart limits: CL = R-bar, UCL = D4·R-bar, LCL = D3·R-bar.
    pub range: ControlLimits,
    /// Mean of each complete subgroup.
    pub subgroup_means: Vec<f64>,
    /// Range (max − min) of each complete subgroup.
    pub subgroup_ranges: Vec<f64>,
    /// The A2 factor applied.
    pub a2: f64,
    /// Whether `a2` came from the table rather than the fallback policy.
    pub a2_tabulated: bool,
}

/// Computes X-bar-R limits using the default [`A2Fallback::SubgroupFive`] policy.
///
/// See [`xbar_r_limits_with`].
///
/// # Examples
///
/// ```
/// use u_quality::spc::xbar_r_limits;
///
/// let values = [10.1, 10.2, 9.9, 10.3, 9.8, 10.0, 10.4, 10.1, 9.9, 10.2];
/// let limits = xbar_r_limits(&values, 5).unwrap();
/// assert!((limits.xbar.cl - 10.09).abs() < 1e-9);
/// assert!(limits.xbar.lcl < limits.xbar.cl && limits.xbar.cl < limits.xbar.ucl);
/// ```
pub fn xbar_r_limits(values: &[f64], subgroup_size: usize) -> Result<XBarRLimits> {
    xbar_r_limits_with(values, subgroup_size, A2Fallback::default())
}

/// Computes X-bar-R limits from a flat series of measurements.
///
/// # Algorithm
///
/// 1. Split `values` into consecutive subgroups of `subgroup_size`; a
///    trailing incomplete subgroup is discarded.
/// 2. R-bar = mean of subgroup ranges.
/// 3. X-double-bar = mean of all supplied values.
/// 4. X-bar limits = X-double-bar ± A2·R-bar; R limits = (D3·R-bar, R-bar, D4·R-bar).
///
/// An empty series yields all-zero limits. A series shorter than one
/// subgroup has R-bar = 0, so the X-bar limits collapse onto the mean.
/// X-bar limits are not clamped at zero: measurements may be negative.
///
/// # Errors
///
/// - [`QcError::InvalidSubgroupSize`] if `subgroup_size == 0`
/// - [`QcError::NonFinite`] if any value is NaN or infinite, or if values
///   near `f64::MAX` push the mean or range past the `f64` range
///
/// # Reference
///
/// Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
/// Chapter 6: Control Charts for Variables.
pub fn xbar_r_limits_with(
    values: &[f64],
    subgroup_size: usize,
    fallback: A2Fallback,
) -> Result<XBarRLimits> {
    if subgroup_size == 0 {
        return Err(QcError::InvalidSubgroupSize(subgroup_size));
    }
    for &v in values {
        ensure_finite(v, "measurement")?;
    }

    let (idx, a2_tabulated) = fallback.table_index(subgroup_size);
    let a2 = A2[idx];

    if values.is_empty() {
        return Ok(XBarRLimits {
            xbar: ControlLimits::ZERO,
            range: ControlLimits::ZERO,
            subgroup_means: Vec::new(),
            subgroup_ranges: Vec::new(),
            a2,
            a2_tabulated,
        });
    }

    let (subgroup_means, subgroup_ranges): (Vec<f64>, Vec<f64>) = values
        .chunks_exact(subgroup_size)
        .map(|group| (mean_or_zero(group), subgroup_range(group)))
        .unzip();

    let grand_mean = mean_or_zero(values);
    let r_bar = mean_or_zero(&subgroup_ranges);

    let xbar = ControlLimits {
        ucl: grand_mean + a2 * r_bar,
        cl: grand_mean,
        lcl: grand_mean - a2 * r_bar,
    }
    .ensure_finite("X-bar limits")?;
    let range = ControlLimits {
        ucl: D4[idx] * r_bar,
        cl: r_bar,
        lcl: D3[idx] * r_bar,
    }
    .ensure_finite("R limits")?;

    Ok(XBarRLimits {
        xbar,
        range,
        subgroup_means,
        subgroup_ranges,
        a2,
        a2_tabulated,
    })
}

/// Compute the range (max - min) of a subgroup.
fn subgroup_range(data: &[f64]) -> f64 {
    let (min, max) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    max - min
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------



#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let values = [10.1, 10.2, 9.9, 10.3, 9.8, 10.0, 10.4, 10.1, 9.9, 10.2, 10.0];
        let limits = xbar_r_limits(&values, 5).expect("valid input");
        let json = serde_json::to_string(&limits).expect("serializable");
        let back: XBarRLimits = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, limits);
    }

    #[test]
    fn test_fallback_policy_names() {
        let json = serde_json::to_string(&A2Fallback::NearestTabulated).expect("serializable");
        assert_eq!(json, r#""NearestTabulated""#);
        let back: A2Fallback = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, A2Fallback::NearestTabulated);
    }
}
