//! End-to-end experiment evaluation.
//!
//! An experiment is described by a JSON config naming the three run
//! artifacts, the evaluators to compute and the figures to render.
//! [`run_experiment`] loads everything, merges the evaluator reports
//! into one map, writes `report.json` into the output directory and
//! renders each figure next to it.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{info, info_span, warn};

use tendiag_core::LoadedRun;
use tendiag_metrics::{EvalReport, EvaluatorSpec};
use tendiag_viz::VisualizerSpec;

/// JSON experiment description.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentConfig {
    pub checkpoint: PathBuf,
    pub training_log: PathBuf,
    pub dataset: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub evaluators: Vec<EvaluatorSpec>,
    #[serde(default)]
    pub visualizers: Vec<VisualizerSpec>,
}

impl ExperimentConfig {
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Everything one experiment run produced.
#[derive(Debug)]
pub struct ExperimentSummary {
    pub report: EvalReport,
    pub report_path: PathBuf,
    pub figures: Vec<PathBuf>,
}

/// Evaluate and render one experiment run.
pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentSummary> {
    let span = info_span!("run_experiment", output_dir = %config.output_dir.display());
    let _guard = span.enter();

    let loaded = LoadedRun::load(&config.checkpoint, &config.training_log, &config.dataset)?;
    let run = loaded.as_run_data();
    info!(
        rank = run.decomposition.rank(),
        n_modes = run.decomposition.n_modes(),
        "loaded run artifacts"
    );

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output dir {}", config.output_dir.display()))?;

    let mut report = EvalReport::new();
    for spec in config.evaluators.iter().cloned() {
        let evaluator = spec.build();
        let span = info_span!("evaluate", evaluator = evaluator.name());
        let _guard = span.enter();

        let partial = evaluator
            .evaluate(&run)
            .with_context(|| format!("evaluator {:?} failed", evaluator.name()))?;
        for (key, value) in partial {
            if report.insert(key.clone(), value).is_some() {
                warn!(key = %key, "duplicate report key overwritten");
            }
        }
    }

    let report_path = config.output_dir.join("report.json");
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| anyhow!("serializing report: {}", e))?;
    fs::write(&report_path, json)
        .with_context(|| format!("writing {}", report_path.display()))?;
    info!(path = %report_path.display(), metrics = report.len(), "wrote report");

    let mut figures = Vec::with_capacity(config.visualizers.len());
    for spec in config.visualizers.iter().cloned() {
        let visualizer = spec.build();
        let span = info_span!("render", visualizer = visualizer.name());
        let _guard = span.enter();

        let path = visualizer
            .render(&run, &config.output_dir)
            .with_context(|| format!("visualizer {:?} failed", visualizer.name()))?;
        info!(path = %path.display(), "rendered figure");
        figures.push(path);
    }

    Ok(ExperimentSummary {
        report,
        report_path,
        figures,
    })
}

/// Install a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Call once at startup; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tendiag=info,warn"));
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .try_init();
}
