/// Sparse-coding solver trait and implementations.
///
/// This module provides a trait-based interface for solving the
/// L1-regularized least-squares problem `‖y − D·a‖₂² + alpha·‖a‖₁` that
/// expresses a single frame `y` as a sparse combination of codebook
/// columns `D`.
pub mod coordinate_descent;

use std::fmt;

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// How chatty a solver is while iterating.
///
/// Passed explicitly instead of silencing process-wide output; `Progress`
/// emits `tracing` debug events per solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// No per-solve output
    #[default]
    Silent,
    /// Emit convergence diagnostics at debug level
    Progress,
}

/// Errors raised by sparse-coding solvers
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Every basis column has (near-)zero norm, the system is unsolvable
    DegenerateBasis { context: String },

    /// A non-finite value appeared during iteration
    NonFinite { context: String },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::DegenerateBasis { context } => {
                write!(
                    f,
                    "Degenerate basis in {}: all columns have zero norm",
                    context
                )
            }
            SolverError::NonFinite { context } => {
                write!(f, "Non-finite value encountered in {}", context)
            }
        }
    }
}

impl std::error::Error for SolverError {}

impl SolverError {
    /// Create a degenerate basis error
    pub fn degenerate_basis(context: impl Into<String>) -> Self {
        SolverError::DegenerateBasis {
            context: context.into(),
        }
    }

    /// Create a non-finite value error
    pub fn non_finite(context: impl Into<String>) -> Self {
        SolverError::NonFinite {
            context: context.into(),
        }
    }
}

/// Trait for L1-regularized least-squares solvers
///
/// Implementations take one frame and a fixed basis matrix and return the
/// coefficient vector minimizing `‖y − D·a‖₂² + alpha·‖a‖₁`. Solvers must
/// be deterministic for fixed inputs and must never mutate the basis.
pub trait SparseSolver: Sync {
    /// Solve for the sparse coefficients of `frame` against `basis`.
    ///
    /// # Arguments
    /// * `basis` - The `d × k` codebook matrix (columns are basis vectors)
    /// * `frame` - The length-`d` frame to encode
    /// * `alpha` - L1 regularization weight, applied as-is
    ///
    /// # Returns
    /// Length-`k` coefficient vector, or an error when the solve breaks
    /// down numerically. Zeros are never silently substituted for a
    /// failed solve.
    fn encode(
        &self,
        basis: ArrayView2<'_, f64>,
        frame: ArrayView1<'_, f64>,
        alpha: f64,
    ) -> Result<Array1<f64>, SolverError>;

    /// Get solver name for logging/debugging
    fn name(&self) -> &str {
        "UnknownSolver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_basis_display() {
        let err = SolverError::degenerate_basis("unit test");
        let msg = err.to_string();
        assert!(msg.contains("unit test"));
        assert!(msg.contains("zero norm"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SolverError>();
    }
}
