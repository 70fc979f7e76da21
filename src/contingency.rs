//! Contingency table analysis.
//!
//! Expected frequencies and chi-squared contributions for an R×C table of
//! observed counts under the null hypothesis of independence.
//!
//! # Zero expected frequency
//!
//! A cell whose expected frequency is zero contributes `0` to the
//! chi-squared total instead of infinity or NaN. This keeps the statistic
//! finite while a table is being filled in, but it is not the textbook
//! treatment: the usual validity rule asks for expected counts of at least
//! 5 in every cell, and results from tables with empty rows or columns
//! should not be read as a formal test.
//!
//! # Examples
//!
//! ```
//! use u_quality::contingency::CountMatrix;
//!
//! let table = CountMatrix::from_rows(&[[30.0, 20.0], [20.0, 30.0]]).unwrap();
//! let analysis = table.analyze();
//! assert!((analysis.chi_square - 4.0).abs() < 1e-12);
//! assert_eq!(analysis.df, 1);
//! ```
//!
//! # References
//!
//! - Agresti, A. (2013). *Categorical Data Analysis*, 3rd ed., Section 3.2.
//! - Cramér, H. (1946). *Mathematical Methods of Statistics*, p. 282.

use crate::error::{QcError, Result};
use crate::special;
use crate::stats::kahan_sum;

/// A rectangular table of non-negative observed counts.
///
/// # Invariants
///
/// - Every row has exactly `n_cols` cells (stored row-major)
/// - Every cell is finite and non-negative
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCountMatrix"))]
pub struct CountMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

/// Unchecked wire form of [`CountMatrix`], validated through [`CountMatrix::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCountMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCountMatrix> for CountMatrix {
    type Error = QcError;

    fn try_from(raw: RawCountMatrix) -> Result<Self> {
        Self::new(raw.rows, raw.cols, raw.cells)
    }
}

/// Number of cells in a `rows × cols` matrix.
fn cell_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols).ok_or(QcError::MatrixTooLarge { rows, cols })
}

/// Maps a raw cell value onto a stored count.
///
/// Missing and non-finite cells read as zero; negative counts are rejected.
fn normalize_cell(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Ok(0.0);
    }
    if value < 0.0 {
        return Err(QcError::Negative {
            what: "observed count",
            value,
        });
    }
    Ok(value)
}

impl CountMatrix {
    /// Creates a `rows × cols` matrix from row-major cells.
    ///
    /// Non-finite cells are stored as zero.
    ///
    /// # Errors
    ///
    /// - [`QcError::MatrixTooLarge`] if `rows * cols` overflows `usize`
    /// - [`QcError::LengthMismatch`] if `cells.len() != rows * cols`
    /// - [`QcError::Negative`] if any cell is negative
    pub fn new(rows: usize, cols: usize, cells: Vec<f64>) -> Result<Self> {
        let expected = cell_count(rows, cols)?;
        if cells.len() != expected {
            return Err(QcError::LengthMismatch {
                expected,
                actual: cells.len(),
            });
        }
        let cells = cells
            .into_iter()
            .map(normalize_cell)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows, cols, cells })
    }

    /// Creates an all-zero `rows × cols` matrix.
    ///
    /// # Errors
    ///
    /// [`QcError::MatrixTooLarge`] if `rows * cols` overflows `usize`.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            rows,
            cols,
            cells: vec![0.0; cell_count(rows, cols)?],
        })
    }

    /// Creates a matrix from possibly ragged rows.
    ///
    /// The column count is the length of the longest row; shorter rows are
    /// padded with zeros. Non-finite cells are stored as zero.
    ///
    /// # Errors
    ///
    /// - [`QcError::MatrixTooLarge`] if the padded table cannot be addressed
    /// - [`QcError::Negative`] if any cell is negative
    ///
    /// # Examples
    ///
    /// ```
    /// use u_quality::contingency::CountMatrix;
    ///
    /// let rows: Vec<Vec<f64>> = vec![vec![1.0, 2.0, 3.0], vec![4.0]];
    /// let m = CountMatrix::from_rows(&rows).unwrap();
    /// assert_eq!((m.n_rows(), m.n_cols()), (2, 3));
    /// assert_eq!(m.get(1, 2), 0.0);
    /// ```
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let n_cols = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
        let mut cells = Vec::with_capacity(cell_count(rows.len(), n_cols)?);
        for row in rows {
            let row = row.as_ref();
            for &v in row {
                cells.push(normalize_cell(v)?);
            }
            cells.extend(std::iter::repeat(0.0).take(n_cols - row.len()));
        }
        Ok(Self {
            rows: rows.len(),
            cols: n_cols,
            cells,
        })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Observed count at `(row, col)`, or `0.0` outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col]
        } else {
            0.0
        }
    }

    /// Replaces one observed count.
    ///
    /// # Errors
    ///
    /// - [`QcError::IndexOutOfBounds`] if `(row, col)` is outside the matrix
    /// - [`QcError::Negative`] if `value` is negative
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(QcError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        self.cells[row * self.cols + col] = normalize_cell(value)?;
        Ok(())
    }

    fn row(&self, row: usize) -> &[f64] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows)
            .map(|i| kahan_sum(self.row(i).iter().copied()))
            .collect()
    }

    /// Sum of each column.
    pub fn col_sums(&self) -> Vec<f64> {
        (0..self.cols)
            .map(|j| kahan_sum((0..self.rows).map(|i| self.get(i, j))))
            .collect()
    }

    /// Sum of all cells.
    pub fn grand_total(&self) -> f64 {
        kahan_sum(self.cells.iter().copied())
    }

    /// Expected count at `(row, col)` under independence:
    /// `row_sum · col_sum / grand_total`.
    ///
    /// The denominator is floored at 1, so an empty table yields zeros.
    /// Returns `0.0` outside the matrix.
    pub fn expected(&self, row: usize, col: usize) -> f64 {
        if row >= self.rows || col >= self.cols {
            return 0.0;
        }
        let row_sum = kahan_sum(self.row(row).iter().copied());
        let col_sum = kahan_sum((0..self.rows).map(|i| self.get(i, col)));
        row_sum * col_sum / self.grand_total().max(1.0)
    }

    /// Chi-squared contribution `(O - E)² / E` of one cell, or `0.0` when
    /// the expected count is zero.
    pub fn chi_cell(&self, row: usize, col: usize) -> f64 {
        chi_contribution(self.get(row, col), self.expected(row, col))
    }

    /// Pearson chi-squared statistic summed over all cells.
    pub fn chi_total(&self) -> f64 {
        self.analyze().chi_square
    }

    /// Degrees of freedom `(R - 1)(C - 1)`, or 0 for a table with fewer than
    /// two rows or columns.
    pub fn degrees_of_freedom(&self) -> usize {
        self.rows.saturating_sub(1) * self.cols.saturating_sub(1)
    }

    /// Computes marginals, expected counts, and chi-squared statistics in
    /// one pass.
    pub fn analyze(&self) -> ContingencyAnalysis {
        let row_sums = self.row_sums();
        let col_sums = self.col_sums();
        let grand_total = self.grand_total();
        let denominator = grand_total.max(1.0);

        let expected: Vec<Vec<f64>> = row_sums
            .iter()
            .map(|&r| col_sums.iter().map(|&c| r * c / denominator).collect())
            .collect();

        let contributions: Vec<Vec<f64>> = expected
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, &e)| chi_contribution(self.get(i, j), e))
                    .collect()
            })
            .collect();

        let chi_square = kahan_sum(contributions.iter().flatten().copied());
        let df = self.degrees_of_freedom();

        let p_value = (df > 0).then(|| special::chi_squared_sf(chi_square, df as f64));

        let min_dim = self.rows.min(self.cols);
        let cramers_v = (grand_total > 0.0 && min_dim > 1)
            .then(|| (chi_square / (grand_total * (min_dim - 1) as f64)).sqrt());

        ContingencyAnalysis {
            row_sums,
            col_sums,
            grand_total,
            expected,
            contributions,
            chi_square,
            df,
            p_value,
            cramers_v,
        }
    }
}

fn chi_contribution(observed: f64, expected: f64) -> f64 {
    if expected > 0.0 {
        (observed - expected).powi(2) / expected
    } else {
        0.0
    }
}

/// Result of [`CountMatrix::analyze`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContingencyAnalysis {
    /// Sum of each row.
    pub row_sums: Vec<f64>,
    /// Sum of each column.
    pub col_sums: Vec<f64>,
    /// Sum of all observed counts.
    pub grand_total: f64,
    /// Expected counts, indexed `[row][col]`.
    pub expected: Vec<Vec<f64>>,
    /// Per-cell chi-squared contributions, indexed `[row][col]`.
    pub contributions: Vec<Vec<f64>>,
    /// Pearson chi-squared statistic (always ≥ 0).
    pub chi_square: f64,
    /// Degrees of freedom `(R - 1)(C - 1)`.
    pub df: usize,
    /// Upper-tail p-value of `chi_square`, `None` when `df == 0`.
    pub p_value: Option<f64>,
    /// Cramér's V association strength in `[0, 1]`, `None` for an empty
    /// table or one with a single row or column.
    pub cramers_v: Option<f64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn matrix_strategy() -> impl Strategy<Value = CountMatrix> {
        (1_usize..=5, 1_usize..=5).prop_flat_map(|(r, c)| {
            proptest::collection::vec(0.0_f64..500.0, r * c)
                .prop_map(move |cells| CountMatrix::new(r, c, cells).expect("valid cells"))
        })
    }

    proptest! {
        #[test]
        fn expected_sums_to_grand_total(m in matrix_strategy()) {
            let a = m.analyze();
            if a.grand_total >= 1.0 {
                let total: f64 = a.expected.iter().flatten().sum();
                prop_assert!((total - a.grand_total).abs() < 1e-6 * a.grand_total.max(1.0),
                    "Σ expected = {total}, N = {}", a.grand_total);
            }
        }

        #[test]
        fn chi_square_non_negative(m in matrix_strategy()) {
            let a = m.analyze();
            prop_assert!(a.chi_square >= 0.0, "chi2 = {}", a.chi_square);
            prop_assert!(a.chi_square.is_finite());
            if let Some(p) = a.p_value {
                prop_assert!((0.0..=1.0).contains(&p), "p = {p}");
            }
            if let Some(v) = a.cramers_v {
                prop_assert!((-1e-12..=1.0 + 1e-9).contains(&v), "V = {v}");
            }
        }

        #[test]
        fn analysis_idempotent(m in matrix_strategy()) {
            prop_assert_eq!(m.analyze(), m.analyze());
        }
    }
}
