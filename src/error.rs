//! Error types for caller-contract violations.
//!
//! Degenerate data (empty series, zero variance, zero expected frequency)
//! is never an error: those cases resolve to zero values or `None` fields
//! on the result types. A [`QcError`] means the caller broke the calling
//! contract, such as passing parallel slices of different lengths.

use thiserror::Error;

/// Error returned when a computation is invoked with invalid arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QcError {
    /// Parallel input series have different lengths.
    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch {
        /// Length of the reference series.
        expected: usize,
        /// Length of the offending series.
        actual: usize,
    },

    /// Subgroup size of zero for an X-bar-R chart.
    #[error("subgroup size must be at least 1, got {0}")]
    InvalidSubgroupSize(usize),

    /// Sample size that is zero, negative, or not finite.
    #[error("sample size must be positive and finite, got {0}")]
    InvalidSampleSize(f64),

    /// Acceptance number larger than the sample size of a sampling plan.
    #[error("acceptance number {c} exceeds sample size {n}")]
    AcceptanceNumberExceedsSampleSize {
        /// Acceptance number.
        c: u32,
        /// Sample size.
        n: u32,
    },

    /// A NaN or infinite value where only finite values are valid.
    #[error("{what} must be finite")]
    NonFinite {
        /// Description of the offending input.
        what: &'static str,
    },

    /// A negative value where only non-negative values are valid.
    #[error("{what} must be non-negative, got {value}")]
    Negative {
        /// Description of the offending input.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Cell index outside a count matrix.
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} matrix")]
    IndexOutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Number of rows in the matrix.
        rows: usize,
        /// Number of columns in the matrix.
        cols: usize,
    },

    /// Matrix dimensions whose cell count does not fit in `usize`.
    #[error("a {rows}x{cols} matrix has too many cells")]
    MatrixTooLarge {
        /// Requested number of rows.
        rows: usize,
        /// Requested number of columns.
        cols: usize,
    },

    /// A value outside its admissible range.
    #[error("{what} is out of range: {value}")]
    OutOfRange {
        /// Description of the offending input.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QcError>;

/// Rejects NaN and infinite values.
pub(crate) fn ensure_finite(value: f64, what: &'static str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(QcError::NonFinite { what })
    }
}

/// Rejects non-finite and negative values.
pub(crate) fn ensure_non_negative(value: f64, what: &'static str) -> Result<()> {
    ensure_finite(value, what)?;
    if value < 0.0 {
        return Err(QcError::Negative { what, value });
    }
    Ok(())
}

/// Rejects series whose length differs from `expected`.
pub(crate) fn ensure_same_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(QcError::LengthMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = QcError::LengthMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "length mismatch: expected 3 values, got 2");

        let err = QcError::AcceptanceNumberExceedsSampleSize { c: 5, n: 3 };
        assert_eq!(err.to_string(), "acceptance number 5 exceeds sample size 3");

        let err = QcError::Negative {
            what: "count",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "count must be non-negative, got -1");
    }

    #[test]
    fn test_guards() {
        assert!(ensure_finite(1.0, "x").is_ok());
        assert_eq!(
            ensure_finite(f64::NAN, "x"),
            Err(QcError::NonFinite { what: "x" })
        );
        assert!(ensure_non_negative(0.0, "x").is_ok());
        assert!(matches!(
            ensure_non_negative(-0.5, "x"),
            Err(QcError::Negative { .. })
        ));
        assert!(ensure_same_len(4, 4).is_ok());
        assert!(ensure_same_len(4, 3).is_err());
    }
}
