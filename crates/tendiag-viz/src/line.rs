//! Line-plot renderers for factor matrices.

use std::error::Error;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use plotters::prelude::*;
use scirs2_core::ndarray_ext::Array2;

use tendiag_core::RunData;

use crate::style::{
    caption_font, component_color, normalized_columns, padded_range, PANEL_HEIGHT, PANEL_WIDTH,
};
use crate::Visualizer;

/// One panel per mode, one line per component.
#[derive(Debug, Clone)]
pub struct FactorLinePlot {
    pub modes: Vec<usize>,
    pub normalize: bool,
    pub show_legend: bool,
}

impl Visualizer for FactorLinePlot {
    fn name(&self) -> &str {
        "factor_lineplot"
    }

    fn render(&self, run: &RunData<'_>, out_dir: &Path) -> Result<PathBuf> {
        if self.modes.is_empty() {
            return Err(anyhow!("factor line plot needs at least one mode"));
        }
        let path = out_dir.join(format!("{}.png", self.name()));
        self.draw(run, &path)
            .map_err(|e| anyhow!("rendering {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "rendered factor line plot");
        Ok(path)
    }
}

impl FactorLinePlot {
    fn draw(&self, run: &RunData<'_>, path: &Path) -> Result<(), Box<dyn Error>> {
        let size = (PANEL_WIDTH * self.modes.len() as u32, PANEL_HEIGHT);
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let panels = root.split_evenly((1, self.modes.len()));
        for (panel, &mode) in panels.iter().zip(self.modes.iter()) {
            let factor = run.decomposition.factor(mode)?;
            let factor = if self.normalize {
                normalized_columns(factor)
            } else {
                factor.clone()
            };

            let title = run
                .dataset
                .mode_name(mode)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Mode {}", mode));

            draw_component_lines(panel, &factor, &title, self.show_legend, mode)?;
        }

        root.present()?;
        Ok(())
    }
}

/// One panel per component of a single mode.
#[derive(Debug, Clone)]
pub struct SingleComponentLinePlot {
    pub mode: usize,
    pub normalize: bool,
}

impl Visualizer for SingleComponentLinePlot {
    fn name(&self) -> &str {
        "single_component_lineplot"
    }

    fn render(&self, run: &RunData<'_>, out_dir: &Path) -> Result<PathBuf> {
        let path = out_dir.join(format!("{}_mode_{}.png", self.name(), self.mode));
        self.draw(run, &path)
            .map_err(|e| anyhow!("rendering {}: {}", path.display(), e))?;
        Ok(path)
    }
}

impl SingleComponentLinePlot {
    fn draw(&self, run: &RunData<'_>, path: &Path) -> Result<(), Box<dyn Error>> {
        let factor = run.decomposition.factor(self.mode)?;
        let factor = if self.normalize {
            normalized_columns(factor)
        } else {
            factor.clone()
        };
        let rank = factor.ncols();

        let size = (PANEL_WIDTH * rank as u32, PANEL_HEIGHT);
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let panels = root.split_evenly((1, rank));
        for (r, panel) in panels.iter().enumerate() {
            let (lo, hi) = padded_range(factor.column(r).iter().copied());

            let mut chart = ChartBuilder::on(panel)
                .caption(format!("Component {}", r), caption_font())
                .margin(10)
                .x_label_area_size(30)
                .y_label_area_size(40)
                .build_cartesian_2d(0f64..factor.nrows() as f64, lo..hi)?;
            chart.configure_mesh().draw()?;

            chart.draw_series(LineSeries::new(
                factor
                    .column(r)
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (i as f64, v)),
                &component_color(r),
            ))?;
        }

        root.present()?;
        Ok(())
    }
}

/// Component lines of one mode with vertical markers wherever the class
/// label changes between consecutive entities.
#[derive(Debug, Clone)]
pub struct ClassLinePlot {
    pub mode: usize,
    pub class_name: String,
}

impl Visualizer for ClassLinePlot {
    fn name(&self) -> &str {
        "class_lineplot"
    }

    fn render(&self, run: &RunData<'_>, out_dir: &Path) -> Result<PathBuf> {
        let path = out_dir.join(format!("{}_mode_{}.png", self.name(), self.mode));
        self.draw(run, &path)
            .map_err(|e| anyhow!("rendering {}: {}", path.display(), e))?;
        Ok(path)
    }
}

impl ClassLinePlot {
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

        let root = BitMapBackend::new(path, (PANEL_WIDTH, PANEL_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let (lo, hi) = padded_range(factor.iter().copied());
        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Mode {} by {}", self.mode, self.class_name), caption_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(-0.5f64..factor.nrows() as f64 - 0.5, lo..hi)?;
        chart.configure_mesh().draw()?;

        for r in 0..factor.ncols() {
            chart.draw_series(LineSeries::new(
                factor
                    .column(r)
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (i as f64, v)),
                &component_color(r),
            ))?;
        }

        // Class boundaries between consecutive entities
        for i in 1..classes.len() {
            if classes[i] != classes[i - 1] {
                let x = i as f64 - 0.5;
                chart.draw_series(LineSeries::new(vec![(x, lo), (x, hi)], &RED))?;
            }
        }

        root.present()?;
        Ok(())
    }
}

fn draw_component_lines<DB>(
    panel: &DrawingArea<DB, plotters::coord::Shift>,
    factor: &Array2<f64>,
    title: &str,
    show_legend: bool,
    mode: usize,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (lo, hi) = padded_range(factor.iter().copied());

    let mut chart = ChartBuilder::on(panel)
        .caption(title, caption_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0f64..factor.nrows() as f64, lo..hi)?;
    chart.configure_mesh().draw()?;

    // Legend labels follow the a0, a1, ... / b0, b1, ... convention,
    // lettered by mode.
    let letter = (b'a' + (mode % 26) as u8) as char;

    for r in 0..factor.ncols() {
        let color = component_color(r);
        let series = chart.draw_series(LineSeries::new(
            factor
                .column(r)
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v)),
            &color,
        ))?;

        if show_legend {
            series
                .label(format!("{}{}", letter, r))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }
    }

    if show_legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    Ok(())
}
