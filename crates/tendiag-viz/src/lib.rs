//! # tendiag-viz - Diagnostic Plots for CP Decomposition Runs
//!
//! Renders the standard diagnostic figures for a fitted CP/PARAFAC
//! decomposition as PNG files:
//!
//! - [`line::FactorLinePlot`]: one panel per mode, one line per component
//! - [`line::SingleComponentLinePlot`]: one panel per component of one mode
//! - [`line::ClassLinePlot`]: component lines with class-boundary markers
//! - [`scatter::FactorScatterPlot`]: per-component scatter, colored by class
//! - [`logplot::LogCurvePlot`]: a logged training curve over iterations
//! - [`factor_map::FactorMapPlot`]: spatial factor maps through a 2-D mask
//!
//! Like the evaluators, visualizers are selected once at config-load
//! time through a tagged [`VisualizerSpec`] and then driven through the
//! one-method [`Visualizer`] trait.

#![deny(warnings)]

pub mod factor_map;
pub mod line;
pub mod logplot;
pub mod scatter;
pub mod style;

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use tendiag_core::RunData;

/// A figure renderer for one run.
pub trait Visualizer {
    /// File stem of the rendered figure.
    fn name(&self) -> &str;

    /// Render the figure into `out_dir`, returning the file written.
    fn render(&self, run: &RunData<'_>, out_dir: &Path) -> Result<PathBuf>;
}

/// Serializable selection of a visualizer, tagged by `type`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum VisualizerSpec {
    FactorLinePlot {
        modes: Vec<usize>,
        #[serde(default = "default_true")]
        normalize: bool,
        #[serde(default = "default_true")]
        show_legend: bool,
    },
    SingleComponentLinePlot {
        mode: usize,
        #[serde(default = "default_true")]
        normalize: bool,
    },
    ClassLinePlot {
        mode: usize,
        class_name: String,
    },
    FactorScatterPlot {
        mode: usize,
        class_name: String,
        #[serde(default = "default_true")]
        normalize: bool,
        #[serde(default = "default_true")]
        common_axis: bool,
    },
    LogCurvePlot {
        curve: String,
    },
    FactorMapPlot {
        mode: usize,
        mask_path: PathBuf,
    },
}

fn default_true() -> bool {
    true
}

impl VisualizerSpec {
    /// Construct the visualizer this spec selects.
    pub fn build(self) -> Box<dyn Visualizer> {
        match self {
            VisualizerSpec::FactorLinePlot {
                modes,
                normalize,
                show_legend,
            } => Box::new(line::FactorLinePlot {
                modes,
                normalize,
                show_legend,
            }),
            VisualizerSpec::SingleComponentLinePlot { mode, normalize } => {
                Box::new(line::SingleComponentLinePlot { mode, normalize })
            }
            VisualizerSpec::ClassLinePlot { mode, class_name } => {
                Box::new(line::ClassLinePlot { mode, class_name })
            }
            VisualizerSpec::FactorScatterPlot {
                mode,
                class_name,
                normalize,
                common_axis,
            } => Box::new(scatter::FactorScatterPlot {
                mode,
                class_name,
                normalize,
                common_axis,
            }),
            VisualizerSpec::LogCurvePlot { curve } => Box::new(logplot::LogCurvePlot { curve }),
            VisualizerSpec::FactorMapPlot { mode, mask_path } => {
                Box::new(factor_map::FactorMapPlot { mode, mask_path })
            }
        }
    }
}
