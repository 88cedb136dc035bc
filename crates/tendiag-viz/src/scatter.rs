//! Class-colored scatter plots of factor loadings.

use std::collections::BTreeSet;
use std::error::Error;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use plotters::prelude::*;

use tendiag_core::RunData;

use crate::style::{
    caption_font, class_color, normalized_columns, padded_range, PANEL_HEIGHT, PANEL_WIDTH,
};
use crate::Visualizer;

/// One panel per component: entities along the x axis, loading on the
/// y axis, markers colored by class membership.
#[derive(Debug, Clone)]
pub struct FactorScatterPlot {
    pub mode: usize,
    pub class_name: String,
    pub normalize: bool,
    /// Share one y range across all component panels.
    pub common_axis: bool,
}

impl Visualizer for FactorScatterPlot {
    fn name(&self) -> &str {
        "factor_scatterplot"
    }

    fn render(&self, run: &RunData<'_>, out_dir: &Path) -> Result<PathBuf> {
        let path = out_dir.join(format!("{}_mode_{}.png", self.name(), self.mode));
        self.draw(run, &path)
            .map_err(|e| anyhow!("rendering {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "rendered factor scatter plot");
        Ok(path)
    }
}

impl FactorScatterPlot {
    fn draw(&self, run: &RunData<'_>, path: &Path) -> Result<(), Box<dyn Error>> {
        let factor = run.decomposition.factor(self.mode)?;
        let classes = run.dataset.class_labels(self.mode, &self.class_name)?;
        if classes.len() != factor.nrows() {
            return Err(format!(
                "{} class labels for a factor matrix with {} rows",
                classes.len(),
                factor.nrows()
            )
            .into());
        }

        let factor = if self.normalize {
            normalized_columns(factor)
        } else {
            factor.clone()
        };
        let rank = factor.ncols();

        let distinct: Vec<i64> = classes
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let size = (PANEL_WIDTH * rank as u32, PANEL_HEIGHT);
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let shared_range = padded_range(factor.iter().copied());
        let panels = root.split_evenly((1, rank));

        for (r, panel) in panels.iter().enumerate() {
            let (lo, hi) = if self.common_axis {
                shared_range
            } else {
                padded_range(factor.column(r).iter().copied())
            };

            let mut chart = ChartBuilder::on(panel)
                .caption(format!("Component {}", r), caption_font())
                .margin(10)
                .x_label_area_size(30)
                .y_label_area_size(40)
                .build_cartesian_2d(-0.5f64..factor.nrows() as f64 - 0.5, lo..hi)?;
            chart.configure_mesh().draw()?;

            for (class_index, &class) in distinct.iter().enumerate() {
                let color = class_color(class_index);
                let series = chart.draw_series(
                    factor
                        .column(r)
                        .iter()
                        .enumerate()
                        .filter(|&(i, _)| classes[i] == class)
                        .map(|(i, &v)| Circle::new((i as f64, v), 4, color.filled())),
                )?;

                series
                    .label(format!("{}", class))
                    .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::sample_run;

    #[test]
    fn test_scatter_renders_per_component_panels() {
        let (decomp, log, dataset) = sample_run();
        let run = RunData {
            decomposition: &decomp,
            log: &log,
            dataset: &dataset,
        };
        let dir = tempfile::tempdir().unwrap();

        let plot = FactorScatterPlot {
            mode: 0,
            class_name: "diagnosis".into(),
            normalize: true,
            common_axis: true,
        };
        let path = plot.render(&run, dir.path()).unwrap();

        assert!(path.ends_with("factor_scatterplot_mode_0.png"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_scatter_without_common_axis() {
        let (decomp, log, dataset) = sample_run();
        let run = RunData {
            decomposition: &decomp,
            log: &log,
            dataset: &dataset,
        };
        let dir = tempfile::tempdir().unwrap();

        let plot = FactorScatterPlot {
            mode: 0,
            class_name: "diagnosis".into(),
            normalize: false,
            common_axis: false,
        };
        assert!(plot.render(&run, dir.path()).is_ok());
    }

    #[test]
    fn test_scatter_label_count_mismatch_fails() {
        let (decomp, log, _) = sample_run();
        let dataset = crate::tests_support::short_labeled_dataset();
        let run = RunData {
            decomposition: &decomp,
            log: &log,
            dataset: &dataset,
        };
        let dir = tempfile::tempdir().unwrap();

        let plot = FactorScatterPlot {
            mode: 0,
            class_name: "diagnosis".into(),
            normalize: true,
            common_axis: true,
        };
        let err = plot.render(&run, dir.path()).unwrap_err();
        assert!(err.to_string().contains("class labels"));
    }

    #[test]
    fn test_scatter_unlabeled_mode_fails() {
        let (decomp, log, dataset) = sample_run();
        let run = RunData {
            decomposition: &decomp,
            log: &log,
            dataset: &dataset,
        };
        let dir = tempfile::tempdir().unwrap();

        let plot = FactorScatterPlot {
            mode: 1,
            class_name: "diagnosis".into(),
            normalize: true,
            common_axis: true,
        };
        assert!(plot.render(&run, dir.path()).is_err());
    }
}
