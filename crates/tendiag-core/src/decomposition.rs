//! CP/PARAFAC decomposition model
//!
//! A CP decomposition represents a tensor as a sum of R rank-1 terms:
//!
//! X ≈ Σᵣ λᵣ (u₁ᵣ ⊗ u₂ᵣ ⊗ ... ⊗ uₙᵣ)
//!
//! Here the factor vectors uᵢᵣ form one factor matrix Uᵢ ∈ ℝ^(Iᵢ×R) per
//! mode, and λᵣ are optional component weights. Every metric and plot in
//! TenDiag operates on this structure.

use scirs2_core::ndarray_ext::{Array1, Array2, ArrayD, ArrayView1, IxDyn};
use scirs2_core::numeric::Float;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecompositionError {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("mode index {mode} out of range for {n_modes}-mode decomposition")]
    InvalidModeIndex { mode: usize, n_modes: usize },

    #[error("invalid decomposition: {0}")]
    InvalidInput(String),
}

/// A CP decomposition: one factor matrix per tensor mode, shared rank.
///
/// Invariants (enforced by [`CpDecomposition::new`]):
/// - at least one factor matrix, each with at least one column
/// - every factor matrix has the same number of columns (the rank)
/// - when weights are present, their length equals the rank
#[derive(Debug, Clone)]
pub struct CpDecomposition<T> {
    factors: Vec<Array2<T>>,
    weights: Option<Array1<T>>,
}

impl<T> CpDecomposition<T>
where
    T: Float,
{
    /// Build a decomposition from factor matrices and optional weights,
    /// validating the shared-rank invariant.
    pub fn new(
        factors: Vec<Array2<T>>,
        weights: Option<Array1<T>>,
    ) -> Result<Self, DecompositionError> {
        if factors.is_empty() {
            return Err(DecompositionError::InvalidInput(
                "a decomposition needs at least one factor matrix".into(),
            ));
        }

        let rank = factors[0].ncols();
        if rank == 0 {
            return Err(DecompositionError::InvalidInput(
                "factor matrices must have at least one component column".into(),
            ));
        }

        for (mode, factor) in factors.iter().enumerate() {
            if factor.ncols() != rank {
                return Err(DecompositionError::ShapeMismatch(format!(
                    "factor matrix for mode {} has {} columns, expected rank {}",
                    mode,
                    factor.ncols(),
                    rank
                )));
            }
        }

        if let Some(w) = &weights {
            if w.len() != rank {
                return Err(DecompositionError::ShapeMismatch(format!(
                    "weight vector has length {}, expected rank {}",
                    w.len(),
                    rank
                )));
            }
        }

        Ok(Self { factors, weights })
    }

    /// Number of components (columns of every factor matrix).
    pub fn rank(&self) -> usize {
        self.factors[0].ncols()
    }

    /// Number of tensor modes (factor matrices).
    pub fn n_modes(&self) -> usize {
        self.factors.len()
    }

    /// Sizes of the original tensor modes.
    pub fn shape(&self) -> Vec<usize> {
        self.factors.iter().map(|f| f.nrows()).collect()
    }

    /// All factor matrices, ordered by mode.
    pub fn factors(&self) -> &[Array2<T>] {
        &self.factors
    }

    /// Component weights, if the checkpoint stored them separately.
    pub fn weights(&self) -> Option<&Array1<T>> {
        self.weights.as_ref()
    }

    /// Factor matrix for one mode.
    pub fn factor(&self, mode: usize) -> Result<&Array2<T>, DecompositionError> {
        self.factors
            .get(mode)
            .ok_or(DecompositionError::InvalidModeIndex {
                mode,
                n_modes: self.factors.len(),
            })
    }

    /// Column `component` of the factor matrix for `mode`.
    pub fn component_column(
        &self,
        mode: usize,
        component: usize,
    ) -> Result<ArrayView1<'_, T>, DecompositionError> {
        let factor = self.factor(mode)?;
        if component >= self.rank() {
            return Err(DecompositionError::InvalidInput(format!(
                "component index {} out of range for rank {}",
                component,
                self.rank()
            )));
        }
        Ok(factor.column(component))
    }

    /// Normalize every factor column to unit length, accumulating the
    /// column norms into the weight vector.
    pub fn normalize_columns(&mut self) {
        let rank = self.rank();
        let mut weights = match self.weights.take() {
            Some(w) => w,
            None => Array1::<T>::ones(rank),
        };

        for factor in &mut self.factors {
            for r in 0..rank {
                let mut norm_sq = T::zero();
                for i in 0..factor.nrows() {
                    let val = factor[[i, r]];
                    norm_sq = norm_sq + val * val;
                }

                let norm = norm_sq.sqrt();
                if norm > T::epsilon() {
                    weights[r] = weights[r] * norm;
                    for i in 0..factor.nrows() {
                        factor[[i, r]] = factor[[i, r]] / norm;
                    }
                }
            }
        }

        self.weights = Some(weights);
    }

    /// Fold the weight vector back into the mode-0 factor matrix.
    ///
    /// After this call the decomposition carries no explicit weights;
    /// metrics that ignore weights (e.g. core consistency) use this to
    /// work with a single canonical form.
    pub fn absorb_weights(&mut self) {
        if let Some(weights) = self.weights.take() {
            let factor = &mut self.factors[0];
            for r in 0..weights.len() {
                for i in 0..factor.nrows() {
                    factor[[i, r]] = factor[[i, r]] * weights[r];
                }
            }
        }
    }

    /// Dense reconstruction X ≈ Σᵣ λᵣ (u₁ᵣ ⊗ ... ⊗ uₙᵣ).
    ///
    /// Time: O(R × ∏ᵢ Iᵢ). Only intended for diagnostics on tensors that
    /// already fit in memory.
    pub fn reconstruct(&self) -> Result<ArrayD<T>, DecompositionError> {
        let shape = self.shape();
        let rank = self.rank();
        let n_modes = self.n_modes();

        let total_size: usize = shape.iter().product();
        let mut data = vec![T::zero(); total_size];

        for r in 0..rank {
            let weight = self.weights.as_ref().map_or(T::one(), |w| w[r]);

            #[allow(clippy::needless_range_loop)]
            for idx in 0..total_size {
                let mut value = weight;
                let mut remaining = idx;

                // Convert linear index to multi-index (row-major)
                for mode in (0..n_modes).rev() {
                    let mode_size = shape[mode];
                    let mode_idx = remaining % mode_size;
                    remaining /= mode_size;

                    value = value * self.factors[mode][[mode_idx, r]];
                }

                data[idx] = data[idx] + value;
            }
        }

        ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
            DecompositionError::ShapeMismatch(format!("reconstruction shape error: {}", e))
        })
    }
}
