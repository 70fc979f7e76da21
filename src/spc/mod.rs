//! Statistical Process Control (SPC) chart limits.
//!
//! Each function takes the raw series for one chart and returns its center
//! line and control limits. Nothing is accumulated between calls.
//!
//! # Variables Charts
//!
//! - [`xbar_r_limits`] — X-bar and Range limits from consecutive subgroups
//!
//! # Attributes Charts
//!
//! - [`np_limits`] — Count of nonconforming items (constant sample size)
//! - [`p_limits`] — Proportion nonconforming (variable sample size)
//! - [`u_limits`] — Defects per unit
//!
//! # Degenerate Input
//!
//! An empty series yields CL = UCL = LCL = 0. Attribute chart lower limits
//! are clamped at zero.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

mod attributes;
mod chart;
mod variables;

pub use attributes::{np_limits, p_limits, u_limits};
pub use chart::{AttributeChart, AttributeChartPoint, ControlLimits};
pub use variables::{a2_factor, xbar_r_limits, xbar_r_limits_with, A2Fallback, XBarRLimits};
