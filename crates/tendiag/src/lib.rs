//! # TenDiag - Evaluation and Visualization of CP Decomposition Runs
//!
//! This is the meta crate that re-exports all TenDiag components and adds
//! the end-to-end experiment runner.
//!
//! ## Quick Start
//!
//! ```
//! use tendiag::prelude::*;
//! use scirs2_core::ndarray_ext::array;
//!
//! let factors = vec![
//!     array![[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]],
//!     array![[1.0, 1.0], [2.0, 0.0]],
//! ];
//! let decomp = CpDecomposition::new(factors, None).unwrap();
//!
//! let report = worst_degeneracy(decomp.factors(), None, true).unwrap();
//! assert!(report.score <= 1.0 && report.score >= -1.0);
//! ```
//!
//! ## Components
//!
//! ### Run Artifacts ([`core`])
//!
//! [`CpDecomposition`], checkpoint/training-log/dataset readers, and the
//! borrowed [`RunData`] view every evaluator and visualizer consumes.
//!
//! ### Metrics ([`metrics`])
//!
//! Final loss, explained variance, best t-test p-value, worst-case
//! degeneracy, core consistency and external clustering accuracy, each
//! selectable through a JSON-tagged [`EvaluatorSpec`].
//!
//! ### Figures ([`viz`])
//!
//! Factor line/scatter plots, class-annotated plots, training-curve plots
//! and spatial factor maps, selectable through [`VisualizerSpec`].
//!
//! ### Experiments ([`experiment`])
//!
//! [`ExperimentConfig`] + [`run_experiment`]: load the three run artifacts,
//! compute every configured metric into `report.json` and render every
//! configured figure into the output directory.

#![deny(warnings)]

pub use tendiag_core as core;
pub use tendiag_metrics as metrics;
pub use tendiag_viz as viz;

pub mod experiment;

pub use experiment::{init_tracing, run_experiment, ExperimentConfig, ExperimentSummary};

pub mod prelude {
    //! Prelude module for convenient imports.
    //!
    //! # Example
    //!
    //! ```
    //! use tendiag::prelude::*;
    //! ```

    pub use crate::core::{
        load_checkpoint, load_dataset, load_training_log, CpDecomposition, DataSet, LoadedRun,
        RunData, TrainingLog,
    };

    pub use crate::metrics::{
        core_consistency, explained_variance, factor_match_score, welch_ttest, worst_degeneracy,
        DegeneracyReport, EvalReport, EvalValue, Evaluator, EvaluatorSpec, FmsOptions,
    };

    pub use crate::viz::{Visualizer, VisualizerSpec};

    pub use crate::experiment::{run_experiment, ExperimentConfig, ExperimentSummary};
}
