//! Attributes control charts: NP, P, and U limits.
//!
//! These charts monitor discrete (count/proportion) data from a process.
//! Limits come from the binomial (NP, P) or Poisson (U) distribution, and a
//! negative lower limit is always clamped to zero because counts, proportions
//! and rates cannot be negative.
//!
//! # Chart Selection Guide
//!
//! | Chart | Data Type | Sample Size | Limits |
//! |-------|-----------|-------------|--------|
//! | NP    | Count defective | Constant | Constant |
//! | P     | Proportion defective | Variable | Per point |
//! | U     | Defects per unit | Not used | Constant |
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 7: Control Charts for Attributes.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use super::chart::{AttributeChart, AttributeChartPoint, ControlLimits};
use crate::error::{ensure_non_negative, ensure_same_len, QcError, Result};
use crate::stats::{kahan_sum, mean_or_zero};

// ---------------------------------------------------------------------------
// NP Chart
// ---------------------------------------------------------------------------

/// Computes NP chart limits for defective counts from samples of constant size.
///
/// # Formulas
///
/// - p-bar = mean(countᵢ / n)
/// - CL = n · p-bar
/// - UCL = CL + 3 · sqrt(n · p-bar · (1 - p-bar))
/// - LCL = max(0, CL - 3 · sqrt(n · p-bar · (1 - p-bar)))
///
/// Every point shares the same limits. An empty series yields all-zero limits.
///
/// # Errors
///
/// - [`QcError::InvalidSampleSize`] if `sample_size == 0`
/// - [`QcError::NonFinite`] / [`QcError::Negative`] for an invalid count
/// - [`QcError::OutOfRange`] if a count exceeds `sample_size`
///
/// # Examples
///
/// ```
/// use u_quality::spc::np_limits;
///
/// let counts = [8.0, 10.0, 7.0, 11.0, 9.0, 12.0, 8.0, 10.0, 9.0, 11.0];
/// let chart = np_limits(&counts, 100).unwrap();
/// assert!((chart.center_line - 9.5).abs() < 1e-9);
/// assert_eq!(chart.points.len(), counts.len());
/// ```
pub fn np_limits(counts: &[f64], sample_size: u64) -> Result<AttributeChart> {
    if sample_size == 0 {
        return Err(QcError::InvalidSampleSize(0.0));
    }
    let n = sample_size as f64;
    for &count in counts {
        ensure_non_negative(count, "defective count")?;
        if count > n {
            return Err(QcError::OutOfRange {
                what: "defective count",
                value: count,
            });
        }
    }
    if counts.is_empty() {
        return Ok(AttributeChart::empty(true));
    }

    let p_bar = kahan_sum(counts.iter().map(|&c| c / n)) / counts.len() as f64;
    let np_bar = n * p_bar;
    let sigma = (np_bar * (1.0 - p_bar)).max(0.0).sqrt();
    let limits =
        ControlLimits::three_sigma_non_negative(np_bar, sigma).ensure_finite("NP chart limits")?;

    Ok(constant_chart(counts, limits))
}

// ---------------------------------------------------------------------------
// P Chart
// ---------------------------------------------------------------------------

/// Computes P chart limits for proportions from samples of varying size.
///
/// # Formulas
///
/// - CL = p-bar = Σ(pᵢ · nᵢ) / Σnᵢ
/// - UCLᵢ = p-bar + 3 · sqrt(p-bar · (1 - p-bar) / nᵢ)
/// - LCLᵢ = max(0, p-bar - 3 · sqrt(p-bar · (1 - p-bar) / nᵢ))
///
/// Limits differ per point, so [`AttributeChart::limits`] is `None`.
///
/// # Errors
///
/// - [`QcError::LengthMismatch`] if the two slices differ in length
/// - [`QcError::InvalidSampleSize`] if any sample size is zero
/// - [`QcError::NonFinite`] / [`QcError::Negative`] / [`QcError::OutOfRange`]
///   if a proportion lies outside `[0, 1]`
///
/// # Examples
///
/// ```
/// use u_quality::spc::p_limits;
///
/// let chart = p_limits(&[0.10, 0.05], &[100, 200]).unwrap();
/// // p-bar = (10 + 10) / 300
/// assert!((chart.center_line - 20.0 / 300.0).abs() < 1e-12);
/// assert!(chart.points[0].ucl > chart.points[1].ucl); // smaller n, wider limits
/// ```
pub fn p_limits(proportions: &[f64], sample_sizes: &[u64]) -> Result<AttributeChart> {
    ensure_same_len(proportions.len(), sample_sizes.len())?;
    for (&p, &n) in proportions.iter().zip(sample_sizes) {
        ensure_non_negative(p, "proportion")?;
        if p > 1.0 {
            return Err(QcError::OutOfRange {
                what: "proportion",
                value: p,
            });
        }
        if n == 0 {
            return Err(QcError::InvalidSampleSize(0.0));
        }
    }
    if proportions.is_empty() {
        return Ok(AttributeChart::empty(false));
    }

    let total_defective = kahan_sum(
        proportions
            .iter()
            .zip(sample_sizes)
            .map(|(&p, &n)| p * n as f64),
    );
    let total_inspected = kahan_sum(sample_sizes.iter().map(|&n| n as f64));
    let p_bar = (total_defective / total_inspected).clamp(0.0, 1.0);

    let points = proportions
        .iter()
        .zip(sample_sizes)
        .enumerate()
        .map(|(i, (&p, &n))| {
            let sigma = (p_bar * (1.0 - p_bar) / n as f64).sqrt();
            let limits = ControlLimits::three_sigma_non_negative(p_bar, sigma);
            AttributeChartPoint::new(i, p, limits)
        })
        .collect();

    Ok(AttributeChart {
        center_line: p_bar,
        limits: None,
        points,
    })
}

// ---------------------------------------------------------------------------
// U Chart
// ---------------------------------------------------------------------------

/// Computes U chart limits for a series of defects-per-unit rates.
///
/// # Formulas
///
/// - CL = u-bar = mean(uᵢ)
/// - UCL = u-bar + 3 · sqrt(u-bar)
/// - LCL = max(0, u-bar - 3 · sqrt(u-bar))
///
/// # Errors
///
/// - [`QcError::NonFinite`] / [`QcError::Negative`] for an invalid rate
/// - [`QcError::NonFinite`] if rates near `f64::MAX` push the limits past
///   the `f64` range
///
/// # Examples
///
/// ```
/// use u_quality::spc::u_limits;
///
/// let chart = u_limits(&[4.0, 4.0, 4.0]).unwrap();
/// let limits = chart.limits.unwrap();
/// assert!((limits.ucl - 10.0).abs() < 1e-12); // 4 + 3·2
/// assert_eq!(limits.lcl, 0.0);                // 4 - 6 clamped
/// ```
pub fn u_limits(defects_per_unit: &[f64]) -> Result<AttributeChart> {
    for &u in defects_per_unit {
        ensure_non_negative(u, "defects per unit")?;
    }
    if defects_per_unit.is_empty() {
        return Ok(AttributeChart::empty(true));
    }

    let u_bar = mean_or_zero(defects_per_unit);
    let limits = ControlLimits::three_sigma_non_negative(u_bar, u_bar.sqrt())
        .ensure_finite("U chart limits")?;

    Ok(constant_chart(defects_per_unit, limits))
}

/// Builds a chart whose points all share `limits`.
fn constant_chart(values: &[f64], limits: ControlLimits) -> AttributeChart {
    AttributeChart {
        center_line: limits.cl,
        limits: Some(limits),
        points: values
            .iter()
            .enumerate()
            .map(|(i, &v)| AttributeChartPoint::new(i, v, limits))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
