//! Spatial factor maps: factor rows projected through a 2-D mask.
//!
//! Voxel-mode factor matrices of spatial data (e.g. a flattened brain
//! slice) carry one row per *masked* grid cell. The mask file records
//! which cells of the full grid are active; rendering scatters each
//! component column back into the grid and colors it with the viridis
//! ramp, centered so that a zero loading sits mid-scale.
//!
//! Mask file format (JSON): `{ "rows": [[true, false, ...], ...] }`,
//! row-major, all rows the same width. Factor rows map to active cells
//! in row-major order.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use serde::Deserialize;

use tendiag_core::RunData;

use crate::style::{caption_font, viridis, PANEL_HEIGHT, PANEL_WIDTH};
use crate::Visualizer;

/// A 2-D inclusion mask loaded from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Mask {
    pub rows: Vec<Vec<bool>>,
}

impl Mask {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading mask {}", path.display()))?;
        let mask: Mask = serde_json::from_str(&text)
            .with_context(|| format!("parsing mask {}", path.display()))?;

        let height = mask.rows.len();
        if height == 0 {
            return Err(anyhow!("mask {} is empty", path.display()));
        }
        let width = mask.rows[0].len();
        if width == 0 || mask.rows.iter().any(|row| row.len() != width) {
            return Err(anyhow!("mask {} is ragged", path.display()));
        }

        Ok(mask)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    /// Number of active cells (the factor row count this mask expects).
    pub fn active_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|&&b| b).count())
            .sum()
    }

    /// Active cell coordinates in row-major order.
    pub fn active_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &b)| b)
                .map(move |(x, _)| (y, x))
        })
    }
}

/// Per-component heatmaps of one spatial mode.
#[derive(Debug, Clone)]
pub struct FactorMapPlot {
    pub mode: usize,
    pub mask_path: PathBuf,
}

impl Visualizer for FactorMapPlot {
    fn name(&self) -> &str {
        "factor_map"
    }

    fn render(&self, run: &RunData<'_>, out_dir: &Path) -> Result<PathBuf> {
        let mask = Mask::load(&self.mask_path)?;

        let factor = run.decomposition.factor(self.mode)?;
        if mask.active_cells() != factor.nrows() {
            return Err(anyhow!(
                "mask has {} active cells but the mode-{} factor has {} rows",
                mask.active_cells(),
                self.mode,
                factor.nrows()
            ));
        }

        let path = out_dir.join(format!("{}_mode_{}.png", self.name(), self.mode));
        draw_maps(factor, &mask, &path)
            .map_err(|e| anyhow!("rendering {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "rendered factor maps");
        Ok(path)
    }
}

fn draw_maps(
    factor: &scirs2_core::ndarray_ext::Array2<f64>,
    mask: &Mask,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let rank = factor.ncols();
    let (height, width) = (mask.height(), mask.width());

    let size = (PANEL_WIDTH * rank as u32, PANEL_HEIGHT);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((1, rank));
    for (r, panel) in panels.iter().enumerate() {
        // Symmetric scale so zero loading is mid-ramp
        let vmax = factor
            .column(r)
            .iter()
            .fold(0.0_f64, |acc, &v| acc.max(v.abs()))
            .max(f64::EPSILON);

        let mut chart = ChartBuilder::on(panel)
            .caption(format!("Component {}", r), caption_font())
            .margin(10)
            .build_cartesian_2d(0f64..width as f64, 0f64..height as f64)?;
        chart.configure_mesh().disable_mesh().draw()?;

        let background = RGBColor(230, 230, 230);
        chart.draw_series((0..height).flat_map(|y| {
            (0..width).map(move |x| {
                Rectangle::new(
                    [(x as f64, y as f64), (x as f64 + 1.0, y as f64 + 1.0)],
                    background.filled(),
                )
            })
        }))?;

        chart.draw_series(mask.active_coords().enumerate().map(|(i, (y, x))| {
            let value = factor[[i, r]];
            let t = 0.5 + 0.5 * value / vmax;
            Rectangle::new(
                [(x as f64, y as f64), (x as f64 + 1.0, y as f64 + 1.0)],
                viridis(t).filled(),
            )
        }))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::Array2;
    use tendiag_core::CpDecomposition;

    fn write_mask(json: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), json).unwrap();
        file
    }

    #[test]
    fn test_mask_accounting() {
        let file = write_mask(r#"{ "rows": [[true, false], [true, true]] }"#);
        let mask = Mask::load(file.path()).unwrap();

        assert_eq!(mask.height(), 2);
        assert_eq!(mask.width(), 2);
        assert_eq!(mask.active_cells(), 3);
        assert_eq!(
            mask.active_coords().collect::<Vec<_>>(),
            vec![(0, 0), (1, 0), (1, 1)]
        );
    }

    #[test]
    fn test_ragged_mask_rejected() {
        let file = write_mask(r#"{ "rows": [[true, false], [true]] }"#);
        assert!(Mask::load(file.path()).is_err());
    }

    #[test]
    fn test_factor_map_renders() {
        let mask_file = write_mask(r#"{ "rows": [[true, true], [false, true]] }"#);

        // 3 active cells -> 3 factor rows
        let factors = vec![
            Array2::from_shape_vec((3, 2), vec![1.0, -0.5, 0.2, 0.8, -1.0, 0.1]).unwrap(),
            Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap(),
        ];
        let decomp = CpDecomposition::new(factors, None).unwrap();
        let (_, log, dataset) = crate::tests_support::sample_run();
        let run = RunData {
            decomposition: &decomp,
            log: &log,
            dataset: &dataset,
        };

        let dir = tempfile::tempdir().unwrap();
        let plot = FactorMapPlot {
            mode: 0,
            mask_path: mask_file.path().to_path_buf(),
        };
        let path = plot.render(&run, dir.path()).unwrap();

        assert!(path.ends_with("factor_map_mode_0.png"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let mask_file = write_mask(r#"{ "rows": [[true, true]] }"#);
        let (decomp, log, dataset) = crate::tests_support::sample_run();
        let run = RunData {
            decomposition: &decomp,
            log: &log,
            dataset: &dataset,
        };

        let dir = tempfile::tempdir().unwrap();
        let plot = FactorMapPlot {
            mode: 0,
            mask_path: mask_file.path().to_path_buf(),
        };
        assert!(plot.render(&run, dir.path()).is_err());
    }
}
