//! # tendiag-metrics - Quality Metrics for CP Decompositions
//!
//! Scalar diagnostics computed over the factor matrices of a fitted
//! CP/PARAFAC decomposition:
//!
//! - [`degeneracy`]: worst-case pairwise component similarity, the
//!   degeneracy diagnostic (brute-force search over all ordered
//!   component pairs)
//! - [`fms`]: the factor-match score combining per-mode cosine
//!   similarities, used both by the degeneracy search and on its own
//! - [`corcondia`]: the core consistency diagnostic for 3-mode tensors
//! - [`stats`]: Welch's two-sample t-test for class separation per
//!   component
//! - [`fit`]: explained variance and relative reconstruction error
//! - [`cluster`]: clustering accuracy via an external scoring oracle
//!   invoked out of process
//! - [`evaluate`]: the config-driven evaluator registry tying the above
//!   to run artifacts
//!
//! All metrics are pure functions of their inputs (the clustering oracle
//! excepted, which shells out by design).
//!
//! # SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.
//! Linear algebra (SVD for pseudo-inverses) uses `scirs2_linalg`.
//! Direct use of `ndarray` is forbidden per project policy.
//!
//! # Quick Start
//!
//! ```
//! use scirs2_core::ndarray_ext::array;
//! use tendiag_metrics::degeneracy::worst_degeneracy;
//!
//! let factors = vec![
//!     array![[1.0_f64, 0.0], [0.0, 1.0]],
//!     array![[1.0, 1.0], [1.0, 1.0]],
//! ];
//!
//! let report = worst_degeneracy(&factors, None, true).unwrap();
//! assert!(report.score.abs() < 1e-12);
//! assert_eq!(report.pair, Some((0, 1)));
//! ```

#![deny(warnings)]

pub mod cluster;
pub mod corcondia;
pub mod degeneracy;
pub mod error;
pub mod evaluate;
pub mod fit;
pub mod fms;
pub mod stats;

#[cfg(test)]
mod property_tests;

pub use cluster::{ClusteringOracle, OracleError};
pub use corcondia::core_consistency;
pub use degeneracy::{worst_degeneracy, DegeneracyReport};
pub use error::MetricError;
pub use evaluate::{EvalReport, EvalValue, Evaluator, EvaluatorSpec};
pub use fit::{explained_variance, relative_error};
pub use fms::{cosine, factor_match_score, FmsOptions};
pub use stats::{best_p_value, welch_ttest, BestPValue, WelchTTest};
