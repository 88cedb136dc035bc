//! # tendiag-core - Decomposition Model and Run Artifacts
//!
//! Core data types shared by every TenDiag evaluator and visualizer:
//!
//! - [`CpDecomposition`]: factor matrices + optional component weights of a
//!   CP/PARAFAC decomposition, with the shared-rank invariant enforced at
//!   construction
//! - [`checkpoint`]: JSON readers for per-run checkpoints and logged
//!   training curves
//! - [`dataset`]: the analyzed dataset (optional dense tensor, mode names,
//!   per-mode class labelings)
//! - [`run`]: bundling of the three artifacts for one experiment run
//!
//! Decompositions are produced by an external decomposition process and
//! loaded read-only; nothing in this crate mutates a checkpoint on disk.
//!
//! # SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.
//! Direct use of `ndarray` is forbidden per project policy.
//!
//! # Quick Start
//!
//! ```
//! use scirs2_core::ndarray_ext::array;
//! use tendiag_core::CpDecomposition;
//!
//! let factors = vec![
//!     array![[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]],
//!     array![[1.0, 1.0], [2.0, 0.0]],
//! ];
//! let decomp = CpDecomposition::new(factors, None).unwrap();
//! assert_eq!(decomp.rank(), 2);
//! assert_eq!(decomp.n_modes(), 2);
//! ```

#![deny(warnings)]

pub mod checkpoint;
pub mod dataset;
pub mod decomposition;
pub mod run;

pub use checkpoint::{load_checkpoint, load_training_log, CheckpointError, Curve, TrainingLog};
pub use dataset::{load_dataset, DataSet, DatasetError};
pub use decomposition::{CpDecomposition, DecompositionError};
pub use run::{LoadedRun, RunData};
