//! Config-driven evaluator registry.
//!
//! Each evaluator turns one run's artifacts into a handful of named
//! scalar results. Which evaluators run is decided once, at
//! configuration-load time, by building a [`EvaluatorSpec`] list from
//! JSON and calling [`EvaluatorSpec::build`]; the evaluators themselves
//! are a flat one-method trait, no hierarchy.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tendiag_core::RunData;

use crate::cluster::ClusteringOracle;
use crate::corcondia::core_consistency;
use crate::degeneracy::worst_degeneracy;
use crate::fit::explained_variance;
use crate::stats::best_p_value;

/// One named result of an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvalValue {
    Scalar(f64),
    Pair(usize, usize),
}

/// Named results of one evaluator (or one whole run).
pub type EvalReport = BTreeMap<String, EvalValue>;

/// A single quality metric computed over one run.
pub trait Evaluator {
    /// Stable name used for logging and report keys.
    fn name(&self) -> &str;

    fn evaluate(&self, run: &RunData<'_>) -> Result<EvalReport>;
}

/// Serializable selection of an evaluator, tagged by `type`.
///
/// ```
/// let spec: tendiag_metrics::EvaluatorSpec = serde_json::from_str(
///     r#"{ "type": "WorstDegeneracy", "return_pair": true }"#,
/// ).unwrap();
/// let evaluator = spec.build();
/// assert_eq!(evaluator.name(), "worst_degeneracy");
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EvaluatorSpec {
    FinalLoss {
        #[serde(default = "default_loss_curve")]
        curve: String,
    },
    ExplainedVariance {
        #[serde(default = "default_variance_curve")]
        curve: String,
    },
    BestPValue {
        mode: usize,
        class_name: String,
    },
    WorstDegeneracy {
        #[serde(default)]
        modes: Option<Vec<usize>>,
        #[serde(default)]
        return_pair: bool,
    },
    CoreConsistency,
    ClusteringAccuracy {
        mode: usize,
        class_name: String,
        oracle: ClusteringOracle,
    },
}

fn default_loss_curve() -> String {
    "loss".into()
}

fn default_variance_curve() -> String {
    "explained_variance".into()
}

impl EvaluatorSpec {
    /// Construct the evaluator this spec selects.
    pub fn build(self) -> Box<dyn Evaluator> {
        match self {
            EvaluatorSpec::FinalLoss { curve } => Box::new(FinalLoss { curve }),
            EvaluatorSpec::ExplainedVariance { curve } => Box::new(ExplainedVariance { curve }),
            EvaluatorSpec::BestPValue { mode, class_name } => {
                Box::new(BestPValueEvaluator { mode, class_name })
            }
            EvaluatorSpec::WorstDegeneracy { modes, return_pair } => {
                Box::new(WorstDegeneracy { modes, return_pair })
            }
            EvaluatorSpec::CoreConsistency => Box::new(CoreConsistency),
            EvaluatorSpec::ClusteringAccuracy {
                mode,
                class_name,
                oracle,
            } => Box::new(ClusteringAccuracy {
                mode,
                class_name,
                oracle,
            }),
        }
    }
}

/// Last value of the logged loss curve.
#[derive(Debug)]
pub struct FinalLoss {
    pub curve: String,
}

impl Evaluator for FinalLoss {
    fn name(&self) -> &str {
        "final_loss"
    }

    fn evaluate(&self, run: &RunData<'_>) -> Result<EvalReport> {
        let value = run.log.final_value(&self.curve)?;
        tracing::debug!(curve = %self.curve, value, "final loss");
        Ok(BTreeMap::from([(
            self.name().to_string(),
            EvalValue::Scalar(value),
        )]))
    }
}

/// Last logged explained variance, recomputed from the data tensor when
/// the curve was not logged but the tensor is available.
#[derive(Debug)]
pub struct ExplainedVariance {
    pub curve: String,
}

impl Evaluator for ExplainedVariance {
    fn name(&self) -> &str {
        "explained_variance"
    }

    fn evaluate(&self, run: &RunData<'_>) -> Result<EvalReport> {
        let value = match run.log.final_value(&self.curve) {
            Ok(v) => v,
            Err(_) if run.dataset.has_tensor() => {
                explained_variance(run.dataset.tensor()?, run.decomposition)?
            }
            Err(e) => return Err(e).context("explained variance not logged and no tensor"),
        };
        Ok(BTreeMap::from([(
            self.name().to_string(),
            EvalValue::Scalar(value),
        )]))
    }
}

/// Minimum Welch p-value over components of one mode's factor matrix.
#[derive(Debug)]
pub struct BestPValueEvaluator {
    pub mode: usize,
    pub class_name: String,
}

impl Evaluator for BestPValueEvaluator {
    fn name(&self) -> &str {
        "best_p_value"
    }

    fn evaluate(&self, run: &RunData<'_>) -> Result<EvalReport> {
        let factor = run.decomposition.factor(self.mode)?;
        let classes = run.dataset.class_labels(self.mode, &self.class_name)?;
        let best = best_p_value(factor, classes)?;
        tracing::debug!(
            mode = self.mode,
            component = best.component,
            p_value = best.p_value,
            "best class-separation p-value"
        );
        Ok(BTreeMap::from([
            (
                format!("best_p_value_mode_{}", self.mode),
                EvalValue::Scalar(best.p_value),
            ),
            (
                format!("best_p_value_mode_{}_component", self.mode),
                EvalValue::Scalar(best.component as f64),
            ),
        ]))
    }
}

/// Worst-case pairwise component similarity.
#[derive(Debug)]
pub struct WorstDegeneracy {
    pub modes: Option<Vec<usize>>,
    pub return_pair: bool,
}

impl Evaluator for WorstDegeneracy {
    fn name(&self) -> &str {
        "worst_degeneracy"
    }

    fn evaluate(&self, run: &RunData<'_>) -> Result<EvalReport> {
        let report = worst_degeneracy(
            run.decomposition.factors(),
            self.modes.as_deref(),
            self.return_pair,
        )?;
        tracing::debug!(score = report.score, pair = ?report.pair, "worst degeneracy");

        let mut out = BTreeMap::from([(
            self.name().to_string(),
            EvalValue::Scalar(report.score),
        )]);
        if let Some((p1, p2)) = report.pair {
            out.insert("worst_degeneracy_pair".into(), EvalValue::Pair(p1, p2));
        }
        Ok(out)
    }
}

/// Core consistency diagnostic; needs the dataset tensor.
#[derive(Debug)]
pub struct CoreConsistency;

impl Evaluator for CoreConsistency {
    fn name(&self) -> &str {
        "core_consistency"
    }

    fn evaluate(&self, run: &RunData<'_>) -> Result<EvalReport> {
        let tensor = run.dataset.tensor()?;
        let cc = core_consistency(tensor, run.decomposition)?;
        Ok(BTreeMap::from([(
            self.name().to_string(),
            EvalValue::Scalar(cc),
        )]))
    }
}

/// Clustering accuracy of one mode's factor matrix, scored externally.
#[derive(Debug)]
pub struct ClusteringAccuracy {
    pub mode: usize,
    pub class_name: String,
    pub oracle: ClusteringOracle,
}

impl Evaluator for ClusteringAccuracy {
    fn name(&self) -> &str {
        "clustering_accuracy"
    }

    fn evaluate(&self, run: &RunData<'_>) -> Result<EvalReport> {
        let factor = run.decomposition.factor(self.mode)?;
        let classes = run.dataset.class_labels(self.mode, &self.class_name)?;
        let accuracy = self.oracle.accuracy(factor, classes)?;
        Ok(BTreeMap::from([(
            format!("clustering_accuracy_mode_{}", self.mode),
            EvalValue::Scalar(accuracy),
        )]))
    }
}
