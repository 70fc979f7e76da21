//! Single-sampling acceptance plans and operating-characteristic (OC) curves.
//!
//! A plan `(n, c)` inspects `n` items from a lot and accepts the lot when at
//! most `c` are defective. With defect probability `p` the number of
//! defectives is Binomial(n, p), so the probability of acceptance is
//! `Pa(p) = P(X ≤ c)`.
//!
//! Probabilities are fractions in `[0, 1]` inside the computations;
//! [`OcSweep`] and [`SamplingPlan::risks`] take percentages.
//!
//! # Examples
//!
//! ```
//! use u_quality::acceptance::{OcSweep, SamplingPlan};
//!
//! let plan = SamplingPlan::new(50, 1).unwrap();
//! let curve = plan.oc_curve(&OcSweep::default());
//! assert_eq!(curve.points[0].pa, 1.0);
//!
//! let risks = plan.risks(1.0, 8.0).unwrap();
//! assert!(risks.alpha > 0.0 && risks.alpha < 0.2);
//! assert!(risks.beta < 0.1);
//! ```
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 15: Lot-by-Lot Acceptance Sampling for Attributes.
//! - Schilling, E.G. & Neubauer, D.V. (2017). *Acceptance Sampling in Quality
//!   Control*, 3rd ed.

use crate::error::{ensure_finite, QcError, Result};

/// Smallest leading term handled by direct multiplication; below this the
/// recurrence runs on logarithms.
const MIN_LEADING_TERM: f64 = 1e-280;

/// Upper bound on the number of samples in one OC sweep.
const MAX_SWEEP_POINTS: usize = 100_000;

/// Binomial cumulative probability `P(X ≤ c)` for `X ~ Binomial(n, p)`.
///
/// # Algorithm
///
/// Starts from `P(X = 0) = (1 - p)ⁿ` and steps
/// `P(X = x) = P(X = x - 1) · (n - x + 1) / x · p / (1 - p)`, summing up to
/// `x = c`. No factorial or binomial coefficient is formed, so large `n`
/// cannot overflow. When `(1 - p)ⁿ` would underflow the same recurrence is
/// carried out on logarithms.
///
/// Edge policy: `p ≤ 0` gives 1; `p ≥ 1` gives 1 if `c ≥ n`, else 0.
/// A NaN `p` propagates.
///
/// # Examples
///
/// ```
/// use u_quality::acceptance::binomial_cdf;
///
/// // 0.98⁵⁰ + 50 · 0.02 · 0.98⁴⁹
/// assert!((binomial_cdf(1, 50, 0.02) - 0.735_771_394).abs() < 1e-8);
/// assert_eq!(binomial_cdf(3, 30, 0.0), 1.0);
/// assert_eq!(binomial_cdf(3, 30, 1.0), 0.0);
/// ```
pub fn binomial_cdf(c: u32, n: u32, p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return 1.0;
    }
    if p >= 1.0 {
        return if c >= n { 1.0 } else { 0.0 };
    }
    if c >= n {
        return 1.0;
    }

    let nf = f64::from(n);
    let log_q = (-p).ln_1p();
    let leading = (nf * log_q).exp();

    if leading >= MIN_LEADING_TERM {
        let ratio = p / (1.0 - p);
        let mut term = leading;
        let mut sum = term;
        for x in 1..=c {
            let xf = f64::from(x);
            term *= (nf - xf + 1.0) / xf * ratio;
            sum += term;
        }
        sum.min(1.0)
    } else {
        let log_ratio = p.ln() - log_q;
        let mut log_term = nf * log_q;
        let mut log_sum = log_term;
        for x in 1..=c {
            let xf = f64::from(x);
            log_term += ((nf - xf + 1.0) / xf).ln() + log_ratio;
            log_sum = log_add_exp(log_sum, log_term);
        }
        log_sum.exp().min(1.0)
    }
}

/// `ln(eᵃ + eᵇ)` without overflow.
fn log_add_exp(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

/// The defect-probability domain of an OC curve, in percent.
///
/// Samples run from 0% in increments of `step_percent`; the last sample
/// is the largest multiple of the step not exceeding `max_percent`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawOcSweep"))]
pub struct OcSweep {
    max_percent: f64,
    step_percent: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawOcSweep {
    max_percent: f64,
    step_percent: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawOcSweep> for OcSweep {
    type Error = QcError;

    fn try_from(raw: RawOcSweep) -> Result<Self> {
        Self::new(raw.max_percent, raw.step_percent)
    }
}

impl Default for OcSweep {
    /// 0% to 20% in 0.5% steps.
    fn default() -> Self {
        Self {
            max_percent: 20.0,
            step_percent: 0.5,
        }
    }
}

impl OcSweep {
    /// Creates a sweep over `[0, max_percent]` with the given step.
    ///
    /// # Errors
    ///
    /// - [`QcError::NonFinite`] if either argument is NaN or infinite
    /// - [`QcError::OutOfRange`] if `max_percent` is outside `[0, 100]`,
    ///   `step_percent <= 0`, or the sweep would exceed 100 000 samples
    pub fn new(max_percent: f64, step_percent: f64) -> Result<Self> {
        Self::default()
            .with_max_percent(max_percent)?
            .with_step_percent(step_percent)
    }

    /// Sets the upper end of the sweep.
    pub fn with_max_percent(mut self, max_percent: f64) -> Result<Self> {
        ensure_finite(max_percent, "maximum defect percentage")?;
        if !(0.0..=100.0).contains(&max_percent) {
            return Err(QcError::OutOfRange {
                what: "maximum defect percentage",
                value: max_percent,
            });
        }
        self.max_percent = max_percent;
        self.check_len()?;
        Ok(self)
    }

    /// Sets the increment between samples.
    pub fn with_step_percent(mut self, step_percent: f64) -> Result<Self> {
        ensure_finite(step_percent, "defect percentage step")?;
        if step_percent <= 0.0 {
            return Err(QcError::OutOfRange {
                what: "defect percentage step",
                value: step_percent,
            });
        }
        self.step_percent = step_percent;
        self.check_len()?;
        Ok(self)
    }

    /// Upper end of the sweep, in percent.
    pub fn max_percent(&self) -> f64 {
        self.max_percent
    }

    /// Increment between samples, in percent.
    pub fn step_percent(&self) -> f64 {
        self.step_percent
    }

    /// Number of samples in the sweep, always at least 1 (the 0% sample).
    pub fn n_points(&self) -> usize {
        // Tolerance keeps e.g. 0.3 / 0.1 from rounding down to 2.
        let steps = (self.max_percent / self.step_percent + 1e-9).floor();
        (steps as usize).saturating_add(1)
    }

    fn check_len(&self) -> Result<()> {
        if self.max_percent / self.step_percent >= MAX_SWEEP_POINTS as f64 {
            return Err(QcError::OutOfRange {
                what: "defect percentage step",
                value: self.step_percent,
            });
        }
        Ok(())
    }

    /// Defect percentages of every sample, computed from the index so that
    /// no rounding error accumulates.
    fn percents(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_points()).map(move |i| (i as f64 * self.step_percent).min(self.max_percent))
    }
}

/// A single-sampling plan: inspect `n` items, accept on at most `c` defectives.
///
/// # Invariants
///
/// - `n >= 1`
/// - `c <= n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawSamplingPlan"))]
pub struct SamplingPlan {
    n: u32,
    c: u32,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawSamplingPlan {
    n: u32,
    c: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawSamplingPlan> for SamplingPlan {
    type Error = QcError;

    fn try_from(raw: RawSamplingPlan) -> Result<Self> {
        Self::new(raw.n, raw.c)
    }
}

impl SamplingPlan {
    /// Creates a plan with sample size `n` and acceptance number `c`.
    ///
    /// `c` is not clamped: a caller passing `c > n` gets an error.
    ///
    /// # Errors
    ///
    /// - [`QcError::InvalidSampleSize`] if `n == 0`
    /// - [`QcError::AcceptanceNumberExceedsSampleSize`] if `c > n`
    pub fn new(n: u32, c: u32) -> Result<Self> {
        if n == 0 {
            return Err(QcError::InvalidSampleSize(0.0));
        }
        if c > n {
            return Err(QcError::AcceptanceNumberExceedsSampleSize { c, n });
        }
        Ok(Self { n, c })
    }

    /// Sample size.
    pub fn sample_size(&self) -> u32 {
        self.n
    }

    /// Acceptance number.
    pub fn acceptance_number(&self) -> u32 {
        self.c
    }

    /// Probability of accepting a lot with defect probability `p` (a fraction).
    ///
    /// # Errors
    ///
    /// [`QcError::NonFinite`] if `p` is NaN or infinite.
    pub fn probability_of_acceptance(&self, p: f64) -> Result<f64> {
        ensure_finite(p, "defect probability")?;
        Ok(binomial_cdf(self.c, self.n, p))
    }

    /// Evaluates the OC curve over `sweep`.
    pub fn oc_curve(&self, sweep: &OcSweep) -> OcCurve {
        let points = sweep
            .percents()
            .map(|percent| {
                let p = percent / 100.0;
                let pa = binomial_cdf(self.c, self.n, p);
                OcPoint {
                    defect_percent: percent,
                    p,
                    pa,
                    aoq: p * pa,
                }
            })
            .collect();
        OcCurve { plan: *self, points }
    }

    /// Producer's and consumer's risk at the given quality levels (percent).
    ///
    /// - α = 1 − Pa(AQL): chance of rejecting a lot at acceptable quality
    /// - β = Pa(RQL): chance of accepting a lot at rejectable quality
    ///
    /// # Errors
    ///
    /// [`QcError::NonFinite`] or [`QcError::OutOfRange`] if either level is
    /// not a percentage in `[0, 100]`.
    pub fn risks(&self, aql_percent: f64, rql_percent: f64) -> Result<PlanRisks> {
        for (value, what) in [(aql_percent, "AQL"), (rql_percent, "RQL")] {
            ensure_finite(value, what)?;
            if !(0.0..=100.0).contains(&value) {
                return Err(QcError::OutOfRange { what, value });
            }
        }
        Ok(PlanRisks {
            aql_percent,
            rql_percent,
            alpha: 1.0 - binomial_cdf(self.c, self.n, aql_percent / 100.0),
            beta: binomial_cdf(self.c, self.n, rql_percent / 100.0),
        })
    }
}

/// One sample of an OC curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OcPoint {
    /// Defect level in percent.
    pub defect_percent: f64,
    /// Defect level as a probability.
    pub p: f64,
    /// Probability of acceptance.
    pub pa: f64,
    /// Average outgoing quality `p · Pa` under rectifying inspection of
    /// large lots.
    pub aoq: f64,
}

/// An OC curve for one sampling plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OcCurve {
    /// The plan the curve was evaluated for.
    pub plan: SamplingPlan,
    /// Samples in increasing defect order.
    pub points: Vec<OcPoint>,
}

impl OcCurve {
    /// Average outgoing quality limit: the sample with the largest AOQ.
    pub fn aoql(&self) -> Option<&OcPoint> {
        self.points
            .iter()
            .max_by(|a, b| a.aoq.total_cmp(&b.aoq))
    }
}

/// Producer's and consumer's risk of a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRisks {
    /// Acceptable quality level, in percent.
    pub aql_percent: f64,
    /// Rejectable quality level, in percent.
    pub rql_percent: f64,
    /// Producer's risk α = 1 − Pa(AQL).
    pub alpha: f64,
    /// Consumer's risk β = Pa(RQL).
    pub beta: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------



#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_oc_curve_round_trip() {
        let plan = SamplingPlan::new(50, 2).expect("valid plan");
        let curve = plan.oc_curve(&OcSweep::default());
        let json = serde_json::to_string(&curve).expect("serializable");
        let back: OcCurve = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, curve);
    }

    #[test]
    fn test_sweep_round_trip() {
        let sweep = OcSweep::new(12.5, 0.25).expect("valid sweep");
        let json = serde_json::to_string(&sweep).expect("serializable");
        assert_eq!(json, r#"{"max_percent":12.5,"step_percent":0.25}"#);
        let back: OcSweep = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, sweep);
    }

    #[test]
    fn test_sweep_invalid_step_rejected() {
        for json in [
            r#"{"max_percent":20.0,"step_percent":0.0}"#,
            r#"{"max_percent":20.0,"step_percent":-1.0}"#,
            r#"{"max_percent":150.0,"step_percent":1.0}"#,
            r#"{"max_percent":100.0,"step_percent":1e-9}"#,
        ] {
            assert!(serde_json::from_str::<OcSweep>(json).is_err(), "{json}");
        }
    }

    #[test]
    fn test_plan_round_trip() {
        let plan = SamplingPlan::new(80, 3).expect("valid plan");
        let json = serde_json::to_string(&plan).expect("serializable");
        assert_eq!(json, r#"{"n":80,"c":3}"#);
        let back: SamplingPlan = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, plan);
    }

    #[test]
    fn test_plan_invalid_rejected() {
        let err = serde_json::from_str::<SamplingPlan>(r#"{"n":3,"c":10}"#)
            .expect_err("c exceeds n");
        assert!(err.to_string().contains("acceptance number 10 exceeds sample size 3"));
        assert!(serde_json::from_str::<SamplingPlan>(r#"{"n":0,"c":0}"#).is_err());
    }

    #[test]
    fn test_curve_with_invalid_plan_rejected() {
        let json = r#"{"plan":{"n":3,"c":10},"points":[]}"#;
        assert!(serde_json::from_str::<OcCurve>(json).is_err());
    }
}
