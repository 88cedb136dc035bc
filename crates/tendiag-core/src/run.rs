//! Bundling of the three per-run artifacts.
//!
//! Evaluators and visualizers all consume the same borrowed view of one
//! run ([`RunData`]); [`LoadedRun`] owns the artifacts and hands out that
//! view.

use std::path::Path;

use anyhow::{Context, Result};

use crate::checkpoint::{load_checkpoint, load_training_log, TrainingLog};
use crate::dataset::{load_dataset, DataSet};
use crate::decomposition::CpDecomposition;

/// Borrowed view of one experiment run.
#[derive(Debug, Clone, Copy)]
pub struct RunData<'a> {
    pub decomposition: &'a CpDecomposition<f64>,
    pub log: &'a TrainingLog,
    pub dataset: &'a DataSet,
}

/// Owned artifacts of one experiment run.
#[derive(Debug)]
pub struct LoadedRun {
    pub decomposition: CpDecomposition<f64>,
    pub log: TrainingLog,
    pub dataset: DataSet,
}

impl LoadedRun {
    /// Load checkpoint, training log and dataset from their JSON files.
    pub fn load(checkpoint: &Path, training_log: &Path, dataset: &Path) -> Result<Self> {
        let decomposition = load_checkpoint(checkpoint)
            .with_context(|| format!("loading checkpoint {}", checkpoint.display()))?;
        let log = load_training_log(training_log)
            .with_context(|| format!("loading training log {}", training_log.display()))?;
        let dataset = load_dataset(dataset)
            .with_context(|| format!("loading dataset {}", dataset.display()))?;

        Ok(Self {
            decomposition,
            log,
            dataset,
        })
    }

    pub fn as_run_data(&self) -> RunData<'_> {
        RunData {
            decomposition: &self.decomposition,
            log: &self.log,
            dataset: &self.dataset,
        }
    }
}
