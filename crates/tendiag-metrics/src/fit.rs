//! Reconstruction-based fit metrics.
//!
//! These recompute fit quality directly from the data tensor instead of
//! trusting the curves logged during fitting; useful when a run's log is
//! incomplete or the logger definition changed between runs.

use scirs2_core::ndarray_ext::ArrayD;

use tendiag_core::CpDecomposition;

use crate::error::MetricError;

/// Relative reconstruction error ‖X − X̂‖ / ‖X‖.
pub fn relative_error(
    tensor: &ArrayD<f64>,
    decomp: &CpDecomposition<f64>,
) -> Result<f64, MetricError> {
    if decomp.shape() != tensor.shape() {
        return Err(MetricError::ShapeMismatch(format!(
            "decomposition shape {:?} does not match tensor shape {:?}",
            decomp.shape(),
            tensor.shape()
        )));
    }

    let recon = decomp.reconstruct()?;

    let mut error_sq = 0.0;
    let mut norm_sq = 0.0;
    for (x, x_hat) in tensor.iter().zip(recon.iter()) {
        let diff = x - x_hat;
        error_sq += diff * diff;
        norm_sq += x * x;
    }

    if norm_sq <= 0.0 {
        return Err(MetricError::InvalidInput(
            "data tensor has zero norm".into(),
        ));
    }

    Ok((error_sq / norm_sq).sqrt())
}

/// Explained variance 1 − ‖X − X̂‖² / ‖X‖².
pub fn explained_variance(
    tensor: &ArrayD<f64>,
    decomp: &CpDecomposition<f64>,
) -> Result<f64, MetricError> {
    let rel = relative_error(tensor, decomp)?;
    Ok(1.0 - rel * rel)
}
