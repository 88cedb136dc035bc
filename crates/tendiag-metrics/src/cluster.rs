//! Clustering accuracy via an external scoring oracle.
//!
//! The third-party clustering routine is not reimplemented; it is
//! invoked as an out-of-process oracle. The protocol:
//!
//! 1. stage the factor matrix and the class labels as CSV artifacts in a
//!    fresh temporary directory
//! 2. run the configured command synchronously with three appended
//!    arguments: `<factor.csv> <classes.csv> <accuracy.out>`
//! 3. parse a single float in `[0, 1]` from the output artifact
//!
//! Every failure mode is a distinct error kind so callers can tell a
//! missing tool from a crashing one from one that wrote garbage.

use std::fs;
use std::path::Path;
use std::process::Command;

use scirs2_core::ndarray_ext::Array2;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to stage oracle artifacts: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch clustering oracle {command:?}: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    #[error("clustering oracle exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("clustering oracle produced malformed output: {0}")]
    MalformedOutput(String),
}

/// Configuration of the external clustering-accuracy tool.
///
/// `command` is the executable; `args` are fixed leading arguments (the
/// three artifact paths are appended after them).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClusteringOracle {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ClusteringOracle {
    /// Score how well the rows of `factor` cluster into `classes`.
    pub fn accuracy(&self, factor: &Array2<f64>, classes: &[i64]) -> Result<f64, OracleError> {
        if classes.len() != factor.nrows() {
            return Err(OracleError::InvalidInput(format!(
                "{} class labels for a factor matrix with {} rows",
                classes.len(),
                factor.nrows()
            )));
        }

        let dir = tempfile::tempdir()?;
        let factor_path = dir.path().join("factor.csv");
        let classes_path = dir.path().join("classes.csv");
        let out_path = dir.path().join("accuracy.out");

        write_factor_csv(&factor_path, factor)?;
        write_classes_csv(&classes_path, classes)?;

        tracing::debug!(command = %self.command, "invoking clustering oracle");
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(&factor_path)
            .arg(&classes_path)
            .arg(&out_path)
            .output()
            .map_err(|source| OracleError::Launch {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OracleError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let text = fs::read_to_string(&out_path).map_err(|_| {
            OracleError::MalformedOutput("oracle wrote no output artifact".into())
        })?;
        let accuracy: f64 = text.trim().parse().map_err(|_| {
            OracleError::MalformedOutput(format!("expected a single float, got {:?}", text.trim()))
        })?;

        if !(0.0..=1.0).contains(&accuracy) {
            return Err(OracleError::MalformedOutput(format!(
                "accuracy {} outside [0, 1]",
                accuracy
            )));
        }

        Ok(accuracy)
    }
}

fn write_factor_csv(path: &Path, factor: &Array2<f64>) -> Result<(), std::io::Error> {
    let mut text = String::new();
    for row in factor.rows() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        text.push_str(&line.join(","));
        text.push('\n');
    }
    fs::write(path, text)
}

fn write_classes_csv(path: &Path, classes: &[i64]) -> Result<(), std::io::Error> {
    let mut text = String::new();
    for c in classes {
        text.push_str(&c.to_string());
        text.push('\n');
    }
    fs::write(path, text)
}
