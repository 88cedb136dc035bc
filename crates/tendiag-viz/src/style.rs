//! Shared figure styling: sizes, palettes, normalization helpers.

use plotters::prelude::*;
use scirs2_core::ndarray_ext::Array2;

/// Default panel size in pixels.
pub const PANEL_WIDTH: u32 = 600;
pub const PANEL_HEIGHT: u32 = 400;

/// Caption font used across all figures.
pub fn caption_font() -> (&'static str, u32) {
    ("sans-serif", 24)
}

/// Stable per-component color.
pub fn component_color(component: usize) -> PaletteColor<Palette99> {
    Palette99::pick(component)
}

/// Stable per-class color, visually distinct from the component palette
/// for small class counts.
pub fn class_color(class_index: usize) -> RGBColor {
    const CLASS_COLORS: [RGBColor; 6] = [
        RGBColor(214, 69, 65),   // tomato
        RGBColor(72, 61, 139),   // dark slate blue
        RGBColor(34, 139, 34),   // forest green
        RGBColor(255, 140, 0),   // dark orange
        RGBColor(106, 90, 205),  // slate blue
        RGBColor(128, 128, 128), // gray
    ];
    CLASS_COLORS[class_index % CLASS_COLORS.len()]
}

/// Viridis color ramp for t in [0, 1], used by the factor maps.
///
/// Piecewise-linear through anchors sampled from the reference colormap
/// at t = 0, 0.25, 0.5, 0.75, 1.
pub fn viridis(t: f64) -> RGBColor {
    const ANCHORS: [(f64, f64, f64); 5] = [
        (0.267004, 0.004874, 0.329415),
        (0.229739, 0.322361, 0.545706),
        (0.127568, 0.566949, 0.550556),
        (0.369214, 0.788888, 0.382914),
        (0.993248, 0.906157, 0.143936),
    ];

    let t = t.clamp(0.0, 1.0);
    let scaled = t * (ANCHORS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(ANCHORS.len() - 2);
    let frac = scaled - i as f64;

    let (r0, g0, b0) = ANCHORS[i];
    let (r1, g1, b1) = ANCHORS[i + 1];
    let channel = |a: f64, b: f64| ((a + (b - a) * frac) * 255.0).round() as u8;

    RGBColor(channel(r0, r1), channel(g0, g1), channel(b0, b1))
}

/// Copy of a factor matrix with every column scaled to unit L2 norm.
/// Zero columns are left untouched.
pub fn normalized_columns(factor: &Array2<f64>) -> Array2<f64> {
    let mut out = factor.clone();
    for r in 0..out.ncols() {
        let norm: f64 = out.column(r).iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > f64::EPSILON {
            for i in 0..out.nrows() {
                out[[i, r]] /= norm;
            }
        }
    }
    out
}

/// Y-axis range covering `values` with a small margin, tolerating flat
/// data.
pub fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 { 0.05 * span } else { 0.5 };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_normalized_columns() {
        let factor = array![[3.0, 0.0], [4.0, 0.0]];
        let normalized = normalized_columns(&factor);

        assert!((normalized[[0, 0]] - 0.6).abs() < 1e-12);
        assert!((normalized[[1, 0]] - 0.8).abs() < 1e-12);
        // Zero column untouched
        assert_eq!(normalized[[0, 1]], 0.0);
        assert_eq!(normalized[[1, 1]], 0.0);
    }

    #[test]
    fn test_padded_range_flat_data() {
        let (lo, hi) = padded_range([2.0, 2.0, 2.0].into_iter());
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn test_viridis_reference_endpoints() {
        // Dark purple low end, bright yellow high end
        assert_eq!(viridis(0.0), RGBColor(68, 1, 84));
        assert_eq!(viridis(1.0), RGBColor(253, 231, 37));
        // Out-of-range inputs clamp to the endpoints
        assert_eq!(viridis(-0.5), viridis(0.0));
        assert_eq!(viridis(1.5), viridis(1.0));
    }

    #[test]
    fn test_viridis_green_channel_monotonic() {
        let mut last = viridis(0.0).1;
        for step in 1..=20 {
            let g = viridis(step as f64 / 20.0).1;
            assert!(g >= last);
            last = g;
        }
    }
}
