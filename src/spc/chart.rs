//! Core control chart result types.
//!
//! Constant-limit charts (X-bar, NP, U) report one [`ControlLimits`];
//! charts whose limits depend on each subgroup's size (P) carry the limits
//! on every [`AttributeChartPoint`].
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use crate::error::{ensure_finite, Result};

/// Control limits for a chart.
///
/// # Invariants
///
/// - `lcl <= cl <= ucl`
/// - All values are finite
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlLimits {
    /// Upper control limit.
    pub ucl: f64,
    /// Center line.
    pub cl: f64,
    /// Lower control limit.
    pub lcl: f64,
}

impl ControlLimits {
    /// Limits collapsed to zero, reported for an empty input series.
    pub const ZERO: Self = Self {
        ucl: 0.0,
        cl: 0.0,
        lcl: 0.0,
    };

    /// Symmetric 3-sigma limits around `cl` with the lower limit clamped at 0.
    pub(crate) fn three_sigma_non_negative(cl: f64, sigma: f64) -> Self {
        Self {
            ucl: cl + 3.0 * sigma,
            cl,
            lcl: (cl - 3.0 * sigma).max(0.0),
        }
    }

    /// Rejects limits pushed past the `f64` range by extreme inputs.
    pub(crate) fn ensure_finite(self, what: &'static str) -> Result<Self> {
        for value in [self.ucl, self.cl, self.lcl] {
            ensure_finite(value, what)?;
        }
        Ok(self)
    }

    /// Whether `value` falls strictly outside the limits.
    pub fn is_outside(&self, value: f64) -> bool {
        value > self.ucl || value < self.lcl
    }
}

/// A single data point on an attributes control chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeChartPoint {
    /// The zero-based index of this point.
    pub index: usize,
    /// The plotted statistic (count, proportion, or rate).
    pub value: f64,
    /// Upper control limit for this point.
    pub ucl: f64,
    /// Center line for this point.
    pub cl: f64,
    /// Lower control limit for this point.
    pub lcl: f64,
    /// Whether the value lies beyond UCL or below LCL.
    pub out_of_control: bool,
}

impl AttributeChartPoint {
    pub(crate) fn new(index: usize, value: f64, limits: ControlLimits) -> Self {
        Self {
            index,
            value,
            ucl: limits.ucl,
            cl: limits.cl,
            lcl: limits.lcl,
            out_of_control: limits.is_outside(value),
        }
    }

    /// The limits that apply to this point.
    pub fn limits(&self) -> ControlLimits {
        ControlLimits {
            ucl: self.ucl,
            cl: self.cl,
            lcl: self.lcl,
        }
    }
}

/// Result of an attributes chart computation (NP, P, or U).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeChart {
    /// Center line shared by every point (p-bar, np-bar, or u-bar).
    pub center_line: f64,
    /// Chart-wide limits when they are the same for every point.
    ///
    /// `None` for the P chart, whose limits vary with each sample size.
    pub limits: Option<ControlLimits>,
    /// One entry per input observation, in input order.
    pub points: Vec<AttributeChartPoint>,
}

impl AttributeChart {
    /// Chart for an empty series: every limit collapses to zero.
    pub(crate) fn empty(constant_limits: bool) -> Self {
        Self {
            center_line: 0.0,
            limits: constant_limits.then_some(ControlLimits::ZERO),
            points: Vec::new(),
        }
    }

    /// Indices of points beyond their control limits.
    pub fn out_of_control_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .filter(|p| p.out_of_control)
            .map(|p| p.index)
            .collect()
    }

    /// Check if the process is in statistical control.
    pub fn is_in_control(&self) -> bool {
        self.points.iter().all(|p| !p.out_of_control)
    }
}
