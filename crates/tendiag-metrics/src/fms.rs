//! Factor-match score between two components' cross-mode representations.
//!
//! Two components, each represented by one factor vector per mode, are
//! compared by taking the cosine similarity of the corresponding vectors
//! in every mode and multiplying the per-mode similarities into a single
//! scalar. The product rule makes the score order-independent in the
//! modes and scale-invariant per mode.
//!
//! Two corrections are optional:
//!
//! - `absolute`: take |cos| per mode, discarding sign ambiguity. The
//!   standard score for comparing a decomposition against ground truth
//!   applies this; the degeneracy diagnostic deliberately does not.
//! - `weight_penalty`: multiply by `1 - |w1 - w2| / max(|w1|, |w2|)`
//!   when component weights are supplied.

use scirs2_core::ndarray_ext::ArrayView1;
use scirs2_core::numeric::Float;

use crate::error::MetricError;

/// Corrections applied on top of the raw cosine product.
///
/// Defaults match the standard factor-match score (both corrections on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmsOptions {
    /// Take the absolute value of each per-mode cosine similarity.
    pub absolute: bool,
    /// Penalize differing component weights.
    pub weight_penalty: bool,
}

impl Default for FmsOptions {
    fn default() -> Self {
        Self {
            absolute: true,
            weight_penalty: true,
        }
    }
}

impl FmsOptions {
    /// The uncorrected score used by the degeneracy diagnostic: signed
    /// cosines, no weight penalty.
    pub fn raw() -> Self {
        Self {
            absolute: false,
            weight_penalty: false,
        }
    }
}

/// Cosine similarity between two vectors.
///
/// Returns zero when either vector has (numerically) zero norm; a dead
/// component cannot be similar to anything.
pub fn cosine<T>(a: &ArrayView1<'_, T>, b: &ArrayView1<'_, T>) -> T
where
    T: Float,
{
    debug_assert_eq!(a.len(), b.len());

    let mut dot = T::zero();
    let mut norm_a_sq = T::zero();
    let mut norm_b_sq = T::zero();

    for (&x, &y) in a.iter().zip(b.iter()) {
        dot = dot + x * y;
        norm_a_sq = norm_a_sq + x * x;
        norm_b_sq = norm_b_sq + y * y;
    }

    let denom = norm_a_sq.sqrt() * norm_b_sq.sqrt();
    if denom <= T::epsilon() {
        return T::zero();
    }

    dot / denom
}

/// Factor-match score between two same-length lists of per-mode vectors.
///
/// `u` and `v` hold one vector per mode for the first and second
/// component respectively. `weights` optionally carries the two
/// components' weights for the weight penalty.
///
/// # Errors
///
/// `ShapeMismatch` when the lists differ in length or any per-mode vector
/// pair differs in length; `InvalidInput` for empty lists.
pub fn factor_match_score<T>(
    u: &[ArrayView1<'_, T>],
    v: &[ArrayView1<'_, T>],
    weights: Option<(T, T)>,
    opts: FmsOptions,
) -> Result<T, MetricError>
where
    T: Float,
{
    if u.len() != v.len() {
        return Err(MetricError::ShapeMismatch(format!(
            "component representations span {} and {} modes",
            u.len(),
            v.len()
        )));
    }
    if u.is_empty() {
        return Err(MetricError::InvalidInput(
            "factor match needs at least one mode".into(),
        ));
    }

    let mut score = T::one();
    for (mode, (a, b)) in u.iter().zip(v.iter()).enumerate() {
        if a.len() != b.len() {
            return Err(MetricError::ShapeMismatch(format!(
                "mode {} vectors have lengths {} and {}",
                mode,
                a.len(),
                b.len()
            )));
        }

        let c = cosine(a, b);
        score = score * if opts.absolute { c.abs() } else { c };
    }

    if opts.weight_penalty {
        if let Some((w1, w2)) = weights {
            let max_weight = w1.abs().max(w2.abs());
            if max_weight > T::zero() {
                score = score * (T::one() - (w1 - w2).abs() / max_weight);
            }
        }
    }

    Ok(score)
}
