//! # u-quality
//!
//! Statistical quality control computations: control chart limits,
//! contingency-table chi-squared analysis, acceptance-sampling OC curves,
//! and simple linear regression with ANOVA.
//!
//! Every function is pure: it reads its arguments, returns a fresh result,
//! and holds no state between calls. Results carry plain `f64` values and
//! leave plotting or display to the caller.
//!
//! ## Modules
//!
//! - [`spc`] — Control chart limits (X̄-R, NP, P, U)
//! - [`contingency`] — Expected counts and chi-squared statistics for R×C tables
//! - [`acceptance`] — Binomial OC curves, producer's and consumer's risk
//! - [`regression`] — Least-squares line with SSR/SSE/SST decomposition and F test
//!
//! ## Error Model
//!
//! - **Degenerate data** (empty series, zero variance, zero expected
//!   frequency) resolves to zero values or `None` fields, never an error.
//! - **Contract violations** (mismatched lengths, `c > n`, negative counts,
//!   NaN where a number is required) return a [`QcError`].
//!
//! ## Features
//!
//! - `serde` — derives `Serialize`/`Deserialize` on result and
//!   configuration types.

pub mod acceptance;
pub mod contingency;
mod error;
pub mod regression;
mod special;
pub mod spc;
mod stats;

pub use error::{QcError, Result};
