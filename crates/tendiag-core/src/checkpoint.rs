//! Readers for per-run checkpoints and logged training curves.
//!
//! A finished decomposition run leaves two JSON artifacts behind:
//!
//! - a **checkpoint** holding the final factor matrices (and optional
//!   component weights) of the fitted model
//! - a **training log** holding named curves of `(iteration, value)`
//!   samples recorded while the decomposition was fitted (loss,
//!   explained variance, ...)
//!
//! Both are loaded read-only. The storage format is deliberately plain
//! JSON; it is glue, not a contract.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use scirs2_core::ndarray_ext::{Array1, Array2};
use serde::Deserialize;
use thiserror::Error;

use crate::decomposition::{CpDecomposition, DecompositionError};

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("malformed checkpoint: {0}")]
    Malformed(String),

    #[error("no logged curve named {0:?}")]
    UnknownCurve(String),

    #[error(transparent)]
    Decomposition(#[from] DecompositionError),
}

/// On-disk checkpoint layout.
///
/// Factor matrices are stored row-major: `factors[mode][row][column]`.
#[derive(Debug, Deserialize)]
pub struct CheckpointFile {
    pub model_type: String,
    pub factors: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

/// One logged training curve: values sampled at the given iterations.
#[derive(Debug, Clone, Deserialize)]
pub struct Curve {
    pub iterations: Vec<u64>,
    pub values: Vec<f64>,
}

impl Curve {
    /// The last logged value, or an error for an empty curve.
    pub fn final_value(&self) -> Result<f64, CheckpointError> {
        self.values
            .last()
            .copied()
            .ok_or_else(|| CheckpointError::Malformed("curve has no logged values".into()))
    }
}

/// All curves logged during one run, keyed by logger name.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingLog {
    pub curves: BTreeMap<String, Curve>,
}

impl TrainingLog {
    /// Look up a curve by name.
    pub fn curve(&self, name: &str) -> Result<&Curve, CheckpointError> {
        self.curves
            .get(name)
            .ok_or_else(|| CheckpointError::UnknownCurve(name.to_string()))
    }

    /// The last value of the named curve.
    pub fn final_value(&self, name: &str) -> Result<f64, CheckpointError> {
        self.curve(name)?.final_value()
    }
}

/// Load the final decomposition from a JSON checkpoint.
pub fn load_checkpoint(path: &Path) -> Result<CpDecomposition<f64>, CheckpointError> {
    let file: CheckpointFile = read_json(path)?;
    tracing::debug!(
        path = %path.display(),
        model_type = %file.model_type,
        n_modes = file.factors.len(),
        "loaded checkpoint"
    );
    decomposition_from_checkpoint(file)
}

/// Turn a parsed checkpoint into a validated decomposition.
pub fn decomposition_from_checkpoint(
    file: CheckpointFile,
) -> Result<CpDecomposition<f64>, CheckpointError> {
    let mut factors = Vec::with_capacity(file.factors.len());
    for (mode, rows) in file.factors.iter().enumerate() {
        factors.push(rows_to_matrix(mode, rows)?);
    }

    let weights = file.weights.map(Array1::from_vec);
    Ok(CpDecomposition::new(factors, weights)?)
}

/// Load logged training curves from a JSON file.
pub fn load_training_log(path: &Path) -> Result<TrainingLog, CheckpointError> {
    let log: TrainingLog = read_json(path)?;

    for (name, curve) in &log.curves {
        if curve.iterations.len() != curve.values.len() {
            return Err(CheckpointError::Malformed(format!(
                "curve {:?} has {} iterations but {} values",
                name,
                curve.iterations.len(),
                curve.values.len()
            )));
        }
    }

    tracing::debug!(path = %path.display(), n_curves = log.curves.len(), "loaded training log");
    Ok(log)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CheckpointError> {
    let text = fs::read_to_string(path).map_err(|source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CheckpointError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn rows_to_matrix(mode: usize, rows: &[Vec<f64>]) -> Result<Array2<f64>, CheckpointError> {
    let n_rows = rows.len();
    if n_rows == 0 {
        return Err(CheckpointError::Malformed(format!(
            "factor matrix for mode {} has no rows",
            mode
        )));
    }

    let n_cols = rows[0].len();
    let mut data = Vec::with_capacity(n_rows * n_cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(CheckpointError::Malformed(format!(
                "factor matrix for mode {} is ragged: row {} has {} entries, expected {}",
                mode,
                i,
                row.len(),
                n_cols
            )));
        }
        data.extend_from_slice(row);
    }

    Array2::from_shape_vec((n_rows, n_cols), data).map_err(|e| {
        CheckpointError::Malformed(format!("factor matrix for mode {}: {}", mode, e))
    })
}
