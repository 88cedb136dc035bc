//! Property-based tests for the degeneracy search and the factor-match
//! score.

use proptest::prelude::*;
use scirs2_core::ndarray_ext::Array2;

use crate::degeneracy::worst_degeneracy;
use crate::fms::{cosine, factor_match_score, FmsOptions};

/// Random factor matrices sharing one rank: (mode sizes, rank, entries).
fn arb_factors() -> impl Strategy<Value = Vec<Array2<f64>>> {
    (2usize..=5, 1usize..=3).prop_flat_map(|(rank, n_modes)| {
        proptest::collection::vec(2usize..=6, n_modes).prop_flat_map(move |sizes| {
            let total: usize = sizes.iter().map(|s| s * rank).sum();
            proptest::collection::vec(-1.0..1.0f64, total).prop_map(move |entries| {
                let mut factors = Vec::with_capacity(sizes.len());
                let mut offset = 0;
                for &size in &sizes {
                    let n = size * rank;
                    let data = entries[offset..offset + n].to_vec();
                    offset += n;
                    factors.push(Array2::from_shape_vec((size, rank), data).unwrap());
                }
                factors
            })
        })
    })
}

proptest! {
    #[test]
    fn prop_deterministic(factors in arb_factors()) {
        let first = worst_degeneracy(&factors, None, true).unwrap();
        let second = worst_degeneracy(&factors, None, true).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_score_bounded(factors in arb_factors()) {
        let report = worst_degeneracy(&factors, None, false).unwrap();
        // Product of cosines over any number of modes stays in [-1, 1]
        prop_assert!(report.score >= -1.0 - 1e-12);
        prop_assert!(report.score <= 1.0 + 1e-12);
    }

    #[test]
    fn prop_mode_order_irrelevant(factors in arb_factors()) {
        let n_modes = factors.len();
        let forward: Vec<usize> = (0..n_modes).collect();
        let reversed: Vec<usize> = (0..n_modes).rev().collect();

        let a = worst_degeneracy(&factors, Some(&forward), false).unwrap();
        let b = worst_degeneracy(&factors, Some(&reversed), false).unwrap();
        prop_assert!((a.score - b.score).abs() < 1e-12);
    }

    #[test]
    fn prop_matches_reference_minimum(factors in arb_factors()) {
        let rank = factors[0].ncols();
        let mut reference = f64::INFINITY;
        for p1 in 0..rank {
            for p2 in 0..rank {
                if p1 == p2 {
                    continue;
                }
                let u: Vec<_> = factors.iter().map(|f| f.column(p1)).collect();
                let v: Vec<_> = factors.iter().map(|f| f.column(p2)).collect();
                let score = factor_match_score(&u, &v, None, FmsOptions::raw()).unwrap();
                reference = reference.min(score);
            }
        }

        let report = worst_degeneracy(&factors, None, false).unwrap();
        prop_assert!((report.score - reference).abs() < 1e-12);
    }

    #[test]
    fn prop_positive_column_scaling_invariant(
        factors in arb_factors(),
        scale in 0.25..20.0f64,
    ) {
        let base = worst_degeneracy(&factors, None, false).unwrap();

        // Scale one column of one factor matrix by a positive factor;
        // cosine similarity must not notice.
        let mut scaled = factors.clone();
        let rank = scaled[0].ncols();
        for i in 0..scaled[0].nrows() {
            scaled[0][[i, rank - 1]] *= scale;
        }

        let report = worst_degeneracy(&scaled, None, false).unwrap();
        prop_assert!((report.score - base.score).abs() < 1e-9);
    }

    #[test]
    fn prop_cosine_symmetric(
        xs in proptest::collection::vec(-10.0..10.0f64, 2..8),
        ys in proptest::collection::vec(-10.0..10.0f64, 2..8),
    ) {
        let n = xs.len().min(ys.len());
        let a = scirs2_core::ndarray_ext::Array1::from_vec(xs[..n].to_vec());
        let b = scirs2_core::ndarray_ext::Array1::from_vec(ys[..n].to_vec());

        let ab = cosine(&a.view(), &b.view());
        let ba = cosine(&b.view(), &a.view());
        prop_assert!((ab - ba).abs() < 1e-12);
        prop_assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&ab));
    }
}
