//! Worst-case pairwise component similarity (degeneracy diagnostic).
//!
//! Degeneracy is the failure mode of iterative CP fitting where two or
//! more components drift towards (anti-)collinearity. It shows up as an
//! extreme factor-match score between a pair of distinct components, so
//! the diagnostic exhaustively scores every ordered pair and reports the
//! minimum.
//!
//! The per-pair score is the *uncorrected* factor-match score
//! ([`FmsOptions::raw`]): signed cosines, no weight penalty. Under the
//! product rule a strongly degenerate pair with an odd number of flipped
//! modes scores near -1, so low means degenerate.

use scirs2_core::ndarray_ext::Array2;
use scirs2_core::numeric::Float;

use crate::error::MetricError;
use crate::fms::{factor_match_score, FmsOptions};

/// Result of the worst-case degeneracy search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegeneracyReport<T> {
    /// Minimum factor-match score over all ordered pairs of distinct
    /// components.
    pub score: T,
    /// The minimizing `(p1, p2)` pair, when requested.
    pub pair: Option<(usize, usize)>,
}

/// Scan all ordered pairs of distinct components for the worst
/// (minimum) uncorrected factor-match score.
///
/// `modes` selects which factor matrices participate; `None` selects all
/// of them. `with_pair` additionally reports the minimizing pair.
///
/// Pairs are visited in ascending `(p1, p2)` order and a strict `<`
/// keeps the first minimum, so ties resolve to the earliest pair.
/// Exactly `rank * (rank - 1)` scores are computed; the search is
/// exhaustive, which is acceptable because rank is small in practice.
///
/// # Errors
///
/// All validation happens before any scoring:
///
/// - `ShapeMismatch` when the factor matrices disagree on rank
/// - `InvalidModeIndex` when `modes` references a missing mode
/// - `NotEnoughComponents` when `rank < 2` (no distinct pairs exist)
/// - `InvalidInput` for an empty factor list or empty mode subset
pub fn worst_degeneracy<T>(
    factors: &[Array2<T>],
    modes: Option<&[usize]>,
    with_pair: bool,
) -> Result<DegeneracyReport<T>, MetricError>
where
    T: Float,
{
    let n_modes = factors.len();
    if n_modes == 0 {
        return Err(MetricError::InvalidInput(
            "degeneracy needs at least one factor matrix".into(),
        ));
    }

    let selected: Vec<usize> = match modes {
        Some(subset) => subset.to_vec(),
        None => (0..n_modes).collect(),
    };
    if selected.is_empty() {
        return Err(MetricError::InvalidInput(
            "mode subset must select at least one mode".into(),
        ));
    }
    for &mode in &selected {
        if mode >= n_modes {
            return Err(MetricError::InvalidModeIndex { mode, n_modes });
        }
    }

    let rank = factors[0].ncols();
    for (mode, factor) in factors.iter().enumerate() {
        if factor.ncols() != rank {
            return Err(MetricError::ShapeMismatch(format!(
                "factor matrix for mode {} has {} columns, expected rank {}",
                mode,
                factor.ncols(),
                rank
            )));
        }
    }
    if rank < 2 {
        return Err(MetricError::NotEnoughComponents(rank));
    }

    let opts = FmsOptions::raw();
    let mut worst_score = T::infinity();
    let mut worst_pair = (0, 0);

    for p1 in 0..rank {
        for p2 in 0..rank {
            if p1 == p2 {
                continue;
            }

            let u: Vec<_> = selected.iter().map(|&m| factors[m].column(p1)).collect();
            let v: Vec<_> = selected.iter().map(|&m| factors[m].column(p2)).collect();

            let score = factor_match_score(&u, &v, None, opts)?;
            if score < worst_score {
                worst_score = score;
                worst_pair = (p1, p2);
            }
        }
    }

    Ok(DegeneracyReport {
        score: worst_score,
        pair: with_pair.then_some(worst_pair),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    /// Mode-0 columns orthogonal, mode-1 columns identical: the product
    /// rule gives 0 * 1 = 0 for both ordered pairs.
    fn orthogonal_times_identical() -> Vec<Array2<f64>> {
        vec![
            array![[1.0, 0.0], [0.0, 1.0]],
            array![[1.0, 1.0], [1.0, 1.0]],
        ]
    }

    #[test]
    fn test_known_input_scenario() {
        let factors = orthogonal_times_identical();
        let report = worst_degeneracy(&factors, None, true).unwrap();

        assert!(report.score.abs() < 1e-12);
        // Both ordered pairs score 0; first minimum wins.
        assert_eq!(report.pair, Some((0, 1)));
    }

    #[test]
    fn test_pair_omitted_when_not_requested() {
        let factors = orthogonal_times_identical();
        let report = worst_degeneracy(&factors, None, false).unwrap();
        assert_eq!(report.pair, None);
    }

    #[test]
    fn test_anticollinear_pair_found() {
        // Component 2 is component 0 flipped in mode 0 only: the raw
        // score for (0, 2) is -1 * 1 = -1, the degenerate minimum.
        let factors = vec![
            array![[1.0, 0.0, -1.0], [0.0, 1.0, 0.0]],
            array![[1.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
        ];
        let report = worst_degeneracy(&factors, None, true).unwrap();

        assert!((report.score + 1.0).abs() < 1e-12);
        assert_eq!(report.pair, Some((0, 2)));
    }

    #[test]
    fn test_mode_subset_restricts_comparison() {
        // Restricted to mode 1 the identical columns score 1 for every
        // pair; mode 0 alone gives 0.
        let factors = orthogonal_times_identical();

        let only_mode_1 = worst_degeneracy(&factors, Some(&[1]), false).unwrap();
        assert!((only_mode_1.score - 1.0).abs() < 1e-12);

        let only_mode_0 = worst_degeneracy(&factors, Some(&[0]), false).unwrap();
        assert!(only_mode_0.score.abs() < 1e-12);
    }

    #[test]
    fn test_mode_subset_order_is_irrelevant() {
        let factors = vec![
            array![[1.0, 0.3], [0.2, 1.0], [0.1, 0.4]],
            array![[0.5, 0.9], [1.0, 0.1]],
            array![[0.7, 0.2], [0.3, 0.8], [0.2, 0.2], [0.9, 0.1]],
        ];

        let forward = worst_degeneracy(&factors, Some(&[0, 1, 2]), true).unwrap();
        let shuffled = worst_degeneracy(&factors, Some(&[2, 0, 1]), true).unwrap();

        assert!((forward.score - shuffled.score).abs() < 1e-12);
        assert_eq!(forward.pair, shuffled.pair);
    }

    #[test]
    fn test_shape_mismatch_rejected_before_scoring() {
        let factors = vec![
            Array2::<f64>::ones((4, 3)),
            Array2::<f64>::ones((5, 4)),
        ];
        let err = worst_degeneracy(&factors, None, false).unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch(_)));
    }

    #[test]
    fn test_rank_one_has_no_pairs() {
        let factors = vec![Array2::<f64>::ones((4, 1)), Array2::<f64>::ones((3, 1))];
        let err = worst_degeneracy(&factors, None, false).unwrap_err();
        assert!(matches!(err, MetricError::NotEnoughComponents(1)));
    }

    #[test]
    fn test_invalid_mode_index() {
        let factors = orthogonal_times_identical();
        let err = worst_degeneracy(&factors, Some(&[0, 2]), false).unwrap_err();
        assert!(matches!(
            err,
            MetricError::InvalidModeIndex { mode: 2, n_modes: 2 }
        ));
    }

    #[test]
    fn test_empty_mode_subset_rejected() {
        let factors = orthogonal_times_identical();
        let err = worst_degeneracy(&factors, Some(&[]), false).unwrap_err();
        assert!(matches!(err, MetricError::InvalidInput(_)));
    }

    #[test]
    fn test_determinism() {
        let factors = vec![
            array![[0.3, 0.7, 0.1], [0.9, 0.2, 0.5], [0.4, 0.4, 0.8]],
            array![[0.6, 0.1, 0.3], [0.2, 0.8, 0.7]],
        ];
        let first = worst_degeneracy(&factors, None, true).unwrap();
        let second = worst_degeneracy(&factors, None, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_matches_exhaustive_reference() {
        // Cross-check against an independent enumeration of the ordered
        // pairs, confirming R*(R-1) scores and the same minimum.
        let factors = vec![
            array![[0.3, 0.7, 0.1, 0.2], [0.9, 0.2, 0.5, 0.6], [0.4, 0.4, 0.8, 0.1]],
            array![[0.6, 0.1, 0.3, 0.9], [0.2, 0.8, 0.7, 0.4]],
        ];
        let rank = 4;

        let mut n_pairs = 0;
        let mut reference = f64::INFINITY;
        for p1 in 0..rank {
            for p2 in 0..rank {
                if p1 == p2 {
                    continue;
                }
                n_pairs += 1;
                let u = [factors[0].column(p1), factors[1].column(p1)];
                let v = [factors[0].column(p2), factors[1].column(p2)];
                let score = factor_match_score(&u, &v, None, FmsOptions::raw()).unwrap();
                if score < reference {
                    reference = score;
                }
            }
        }

        assert_eq!(n_pairs, rank * (rank - 1));
        let report = worst_degeneracy(&factors, None, false).unwrap();
        assert!((report.score - reference).abs() < 1e-12);
    }
}
