//! Simple linear regression with an ANOVA decomposition.
//!
//! Fits `y = b0 + b1·x` by ordinary least squares and splits the total
//! variation of `y` into regression and error sums of squares.
//!
//! # Examples
//!
//! ```
//! use u_quality::regression::simple_linear_regression;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.1, 3.9, 6.1, 7.9, 10.1];
//! let fit = simple_linear_regression(&x, &y).unwrap().expect("x varies");
//! assert!((fit.slope - 2.0).abs() < 0.1);
//! assert!(fit.r_squared.unwrap() > 0.99);
//! assert_eq!(fit.df_error, 3);
//! ```

use crate::error::{ensure_finite, ensure_same_len, Result};
use crate::special;
use crate::stats::{kahan_sum, mean_or_zero};

/// Result of a simple linear regression: `y = intercept + slope · x`.
///
/// Statistics that are undefined for the data (for example `R²` when every
/// `y` is equal) are `None` rather than a silent 0 or 1.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegressionAnova {
    /// Slope coefficient (b1 = Sxy / Sxx).
    pub slope: f64,
    /// Intercept (b0 = ȳ − b1·x̄).
    pub intercept: f64,
    /// Number of points.
    pub n: usize,
    /// Mean of x.
    pub x_mean: f64,
    /// Mean of y.
    pub y_mean: f64,
    /// Σ(xᵢ − x̄)².
    pub sxx: f64,
    /// Σ(xᵢ − x̄)(yᵢ − ȳ).
    pub sxy: f64,
    /// Fitted values (ŷᵢ).
    pub fitted: Vec<f64>,
    /// Residuals (yᵢ − ŷᵢ).
    pub residuals: Vec<f64>,
    /// Regression sum of squares Σ(ŷᵢ − ȳ)².
    pub ssr: f64,
    /// Error sum of squares Σ(yᵢ − ŷᵢ)².
    pub sse: f64,
    /// Total sum of squares Σ(yᵢ − ȳ)², computed directly from the data.
    pub sst: f64,
    /// Coefficient of determination SSR / SST; `None` when SST = 0.
    pub r_squared: Option<f64>,
    /// Regression degrees of freedom (always 1).
    pub df_regression: usize,
    /// Error degrees of freedom (n − 2).
    pub df_error: usize,
    /// Regression mean square SSR / 1.
    pub msr: f64,
    /// Error mean square SSE / (n − 2); `None` when n = 2.
    pub mse: Option<f64>,
    /// F = MSR / MSE; `None` unless MSE is defined and positive.
    pub f_statistic: Option<f64>,
    /// Upper-tail p-value of F on (1, n − 2) degrees of freedom.
    pub f_p_value: Option<f64>,
    /// Residual standard error √MSE.
    pub residual_se: Option<f64>,
}

impl RegressionAnova {
    /// Predicted `y` at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fits a line to paired samples.
///
/// Same as [`simple_linear_regression`] with the pairs split into x and y.
///
/// # Examples
///
/// ```
/// use u_quality::regression::fit_pairs;
///
/// let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
/// let fit = fit_pairs(&points).unwrap().unwrap();
/// assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
/// ```
pub fn fit_pairs(points: &[(f64, f64)]) -> Result<Option<RegressionAnova>> {
    let (x, y): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    simple_linear_regression(&x, &y)
}

/// Computes simple linear regression (OLS closed form) and its ANOVA table.
///
/// # Algorithm
///
/// - b1 = Sxy / Sxx, b0 = ȳ − b1·x̄
/// - SSR = Σ(ŷᵢ − ȳ)², SSE = Σ(yᵢ − ŷᵢ)², SST = Σ(yᵢ − ȳ)²
/// - R² = SSR / SST, MSR = SSR / 1, MSE = SSE / (n − 2), F = MSR / MSE
///
/// SST is summed from the data rather than taken as SSR + SSE, so the two
/// can be compared as a numerical check.
///
/// # Returns
///
/// `Ok(None)` when no unique line exists: fewer than 2 points, or no
/// variation in x (Sxx ≤ 0).
///
/// # Errors
///
/// - [`QcError::LengthMismatch`](crate::QcError::LengthMismatch) if `x` and `y` differ in length
/// - [`QcError::NonFinite`](crate::QcError::NonFinite) if any value is NaN or infinite
///
/// # References
///
/// Draper & Smith (1998). "Applied Regression Analysis", 3rd edition.
pub fn simple_linear_regression(x: &[f64], y: &[f64]) -> Result<Option<RegressionAnova>> {
    ensure_same_len(x.len(), y.len())?;
    for (&xi, &yi) in x.iter().zip(y) {
        ensure_finite(xi, "x value")?;
        ensure_finite(yi, "y value")?;
    }

    let n = x.len();
    if n < 2 {
        return Ok(None);
    }

    let x_mean = mean_or_zero(x);
    let y_mean = mean_or_zero(y);

    let sxx = kahan_sum(x.iter().map(|&xi| (xi - x_mean).powi(2)));
    if sxx <= 0.0 {
        return Ok(None);
    }
    let sxy = kahan_sum(
        x.iter()
            .zip(y)
            .map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean)),
    );

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    // Fitted values and residuals
    let fitted: Vec<f64> = x.iter().map(|&xi| intercept + slope * xi).collect();
    let residuals: Vec<f64> = y
        .iter()
        .zip(fitted.iter())
        .map(|(&yi, &fi)| yi - fi)
        .collect();

    // Sum of squares
    let ssr = kahan_sum(fitted.iter().map(|&fi| (fi - y_mean).powi(2)));
    let sse = kahan_sum(residuals.iter().map(|r| r * r));
    let sst = kahan_sum(y.iter().map(|&yi| (yi - y_mean).powi(2)));

    let r_squared = (sst > 0.0).then(|| ssr / sst);

    let df_regression: usize = 1;
    let df_error = n - 2;
    let msr = ssr / df_regression as f64;
    let mse = (df_error > 0).then(|| sse / df_error as f64);
    let f_statistic = mse.filter(|&m| m > 0.0).map(|m| msr / m);
    let f_p_value = f_statistic.map(|f| special::f_sf(f, df_regression as f64, df_error as f64));
    let residual_se = mse.map(f64::sqrt);

    Ok(Some(RegressionAnova {
        slope,
        intercept,
        n,
        x_mean,
        y_mean,
        sxx,
        sxy,
        fitted,
        residuals,
        ssr,
        sse,
        sst,
        r_squared,
        df_regression,
        df_error,
        msr,
        mse,
        f_statistic,
        f_p_value,
        residual_se,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QcError;

    fn fit(x: &[f64], y: &[f64]) -> RegressionAnova {
        simple_linear_regression(x, y)
            .expect("valid input")
            .expect("computable fit")
    }

    #[test]
    fn test_exact_line() {
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&xi| 2.0 * xi + 1.0).collect();
        let r = fit(&x, &y);

        assert!((r.slope - 2.0).abs() < 1e-12);
        assert!((r.intercept - 1.0).abs() < 1e-12);
        assert!((r.r_squared.expect("y varies") - 1.0).abs() < 1e-12);
        assert!(r.sse.abs() < 1e-20, "sse = {}", r.sse);
        for res in &r.residuals {
            assert!(res.abs() < 1e-12);
        }
    }

    #[test]
    fn test_increasing_series() {
        // (1, 2.0), (2, 2.4), ..., (10, 5.6) with small wobble
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        let wobble = [0.05, -0.03, 0.02, -0.04, 0.01, 0.03, -0.02, 0.04, -0.01, 0.0];
        let y: Vec<f64> = x
            .iter()
            .zip(wobble)
            .map(|(&xi, w)| 2.0 + 0.4 * (xi - 1.0) + w)
            .collect();
        assert!((y[9] - 5.6).abs() < 1e-12);

        let r = fit(&x, &y);
        assert!(r.slope > 0.0);
        assert!(r.r_squared.expect("y varies") > 0.9);
        assert!(r.f_p_value.expect("F defined") < 1e-6);
    }

    #[test]
    fn test_anova_decomposition() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = [2.3, 2.9, 4.1, 4.4, 5.9, 6.1, 7.4, 7.6];
        let r = fit(&x, &y);

        assert!(
            (r.sst - (r.ssr + r.sse)).abs() < 1e-10,
            "SST = {} vs SSR + SSE = {}",
            r.sst,
            r.ssr + r.sse
        );
        assert_eq!(r.df_regression, 1);
        assert_eq!(r.df_error, 6);

        let mse = r.mse.expect("df_error > 0");
        assert!((mse - r.sse / 6.0).abs() < 1e-12);
        assert!((r.msr - r.ssr).abs() < 1e-12);
        let f = r.f_statistic.expect("mse > 0");
        assert!((f - r.msr / mse).abs() < 1e-9);
        assert!((r.residual_se.expect("mse defined") - mse.sqrt()).abs() < 1e-12);

        // F = t² for simple regression: t = b1 / sqrt(MSE / Sxx)
        let t = r.slope / (mse / r.sxx).sqrt();
        assert!((f - t * t).abs() < 1e-6 * f);
    }

    #[test]
    fn test_two_points() {
        let r = fit(&[0.0, 2.0], &[1.0, 5.0]);
        assert!((r.slope - 2.0).abs() < 1e-12);
        assert!((r.intercept - 1.0).abs() < 1e-12);
        assert_eq!(r.df_error, 0);
        assert!(r.mse.is_none());
        assert!(r.f_statistic.is_none());
        assert!(r.f_p_value.is_none());
        assert!(r.residual_se.is_none());
        assert!((r.r_squared.expect("y varies") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_y_leaves_r_squared_undefined() {
        let r = fit(&[1.0, 2.0, 3.0, 4.0], &[5.0, 5.0, 5.0, 5.0]);
        assert_eq!(r.slope, 0.0);
        assert_eq!(r.sst, 0.0);
        assert!(r.r_squared.is_none());
        // MSE = 0, so F is undefined too
        assert_eq!(r.mse, Some(0.0));
        assert!(r.f_statistic.is_none());
    }

    #[test]
    fn test_not_computable() {
        assert_eq!(simple_linear_regression(&[], &[]), Ok(None));
        assert_eq!(simple_linear_regression(&[1.0], &[2.0]), Ok(None));
        // zero variance in x
        assert_eq!(
            simple_linear_regression(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Ok(None)
        );
    }

    #[test]
    fn test_contract_violations() {
        assert_eq!(
            simple_linear_regression(&[1.0, 2.0], &[1.0]),
            Err(QcError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            simple_linear_regression(&[1.0, f64::NAN], &[1.0, 2.0]),
            Err(QcError::NonFinite { what: "x value" })
        ));
        assert!(matches!(
            fit_pairs(&[(1.0, 2.0), (2.0, f64::INFINITY)]),
            Err(QcError::NonFinite { what: "y value" })
        ));
    }

    #[test]
    fn test_fit_pairs_matches_slices() {
        let points = [(1.0, 1.5), (2.0, 3.7), (3.0, 4.1), (4.0, 6.3)];
        let (x, y): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
        assert_eq!(
            fit_pairs(&points),
            simple_linear_regression(&x, &y)
        );
    }

    #[test]
    fn test_negative_slope() {
        let r = fit(&[1.0, 2.0, 3.0, 4.0, 5.0], &[10.0, 8.1, 5.9, 4.2, 1.8]);
        assert!(r.slope < 0.0);
        assert!(r.r_squared.expect("y varies") > 0.99);
        assert!(r.predict(0.0) > 10.0);
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.1, 3.9, 6.2, 7.8, 10.1, 12.0];
        let fit = simple_linear_regression(&x, &y)
            .expect("valid input")
            .expect("x varies");
        let json = serde_json::to_string(&fit).expect("serializable");
        let back: RegressionAnova = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, fit);
    }

    #[test]
    fn test_undefined_statistics_serialize_as_null() {
        let fit = simple_linear_regression(&[0.0, 1.0], &[3.0, 3.0])
            .expect("valid input")
            .expect("x varies");
        let value = serde_json::to_value(&fit).expect("serializable");
        assert!(value["r_squared"].is_null());
        assert!(value["mse"].is_null());
        assert!(value["f_statistic"].is_null());
        let back: RegressionAnova = serde_json::from_value(value).expect("deserializable");
        assert_eq!(back, fit);
    }
}
