//! Tuning parameters shared by compression and arithmetic.

use crate::types::{HMatrixError, Result};

/// How the SVD engine removes a found component from the working Gram matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deflation {
    /// Subtract the rank one term, $B \leftarrow B - \lambda v v^T$.
    Hotelling,
    /// Project the found direction out, $B \leftarrow (I - vv^T) B (I - vv^T)$.
    ///
    /// Agrees with `Hotelling` for converged eigenvectors. For clustered singular
    /// values it keeps the right singular vectors mutually orthogonal.
    Projected,
}

/// Parameters controlling rank truncation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionParams {
    /// Maximum rank of any leaf block.
    pub max_rank: usize,
    /// Singular values below `epsilon` are discarded.
    pub epsilon: f64,
    /// Number of power iteration steps per singular triple.
    pub power_iterations: usize,
    /// Deflation strategy of the SVD engine.
    pub deflation: Deflation,
}

impl Default for CompressionParams {
    fn default() -> Self {
        CompressionParams {
            max_rank: 8,
            epsilon: 1E-6,
            power_iterations: 100,
            deflation: Deflation::Hotelling,
        }
    }
}

impl CompressionParams {
    pub fn new(max_rank: usize, epsilon: f64) -> Self {
        CompressionParams {
            max_rank,
            epsilon,
            ..Default::default()
        }
    }

    pub fn with_power_iterations(mut self, power_iterations: usize) -> Self {
        self.power_iterations = power_iterations;
        self
    }

    pub fn with_deflation(mut self, deflation: Deflation) -> Self {
        self.deflation = deflation;
        self
    }

    /// Check that the parameters describe a usable truncation.
    pub fn validate(&self) -> Result<()> {
        if self.max_rank == 0 {
            return Err(HMatrixError::InvalidParameter(
                "`max_rank` must be positive".to_string(),
            ));
        }
        if !(self.epsilon >= 0.0) || !self.epsilon.is_finite() {
            return Err(HMatrixError::InvalidParameter(format!(
                "`epsilon` must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if self.power_iterations == 0 {
            return Err(HMatrixError::InvalidParameter(
                "`power_iterations` must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
