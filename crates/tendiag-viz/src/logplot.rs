//! Logged training curves over iterations.

use std::error::Error;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use plotters::prelude::*;

use tendiag_core::RunData;

use crate::style::{caption_font, padded_range, PANEL_HEIGHT, PANEL_WIDTH};
use crate::Visualizer;

/// One logged curve (loss, explained variance, ...) against iteration.
#[derive(Debug, Clone)]
pub struct LogCurvePlot {
    pub curve: String,
}

impl Visualizer for LogCurvePlot {
    fn name(&self) -> &str {
        "logplot"
    }

    fn render(&self, run: &RunData<'_>, out_dir: &Path) -> Result<PathBuf> {
        let path = out_dir.join(format!("{}_{}.png", self.name(), self.curve));
        self.draw(run, &path)
            .map_err(|e| anyhow!("rendering {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), curve = %self.curve, "rendered log curve");
        Ok(path)
    }
}

impl LogCurvePlot {
    fn draw(&self, run: &RunData<'_>, path: &Path) -> Result<(), Box<dyn Error>> {
        let curve = run.log.curve(&self.curve)?;
        if curve.values.is_empty() {
            return Err(format!("curve {:?} has no logged values", self.curve).into());
        }

        let root = BitMapBackend::new(path, (PANEL_WIDTH, PANEL_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let max_iter = curve.iterations.iter().copied().max().unwrap_or(1).max(1);
        let (lo, hi) = padded_range(curve.values.iter().copied());

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.curve, caption_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..max_iter as f64, lo..hi)?;
        chart
            .configure_mesh()
            .x_desc("Iteration")
            .y_desc("Value")
            .draw()?;

        chart.draw_series(LineSeries::new(
            curve
                .iterations
                .iter()
                .zip(curve.values.iter())
                .map(|(&it, &v)| (it as f64, v)),
            &BLUE,
        ))?;

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::sample_run;

    #[test]
    fn test_log_curve_renders() {
        let (decomp, log, dataset) = sample_run();
        let run = RunData {
            decomposition: &decomp,
            log: &log,
            dataset: &dataset,
        };
        let dir = tempfile::tempdir().unwrap();

        let plot = LogCurvePlot {
            curve: "loss".into(),
        };
        let path = plot.render(&run, dir.path()).unwrap();

        assert!(path.ends_with("logplot_loss.png"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_unknown_curve_fails() {
        let (decomp, log, dataset) = sample_run();
        let run = RunData {
            decomposition: &decomp,
            log: &log,
            dataset: &dataset,
        };
        let dir = tempfile::tempdir().unwrap();

        let plot = LogCurvePlot {
            curve: "nope".into(),
        };
        assert!(plot.render(&run, dir.path()).is_err());
    }
}
