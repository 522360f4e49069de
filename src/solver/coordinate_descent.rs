//! Cyclic coordinate-descent LASSO solver.
//!
//! Minimizes `‖y − D·a‖₂² + alpha·‖a‖₁` one coefficient at a time with
//! incremental residual updates. Each coordinate has a closed-form
//! soft-threshold solution, so the sweep is cheap and the iterate is
//! monotone in the objective.

use ndarray::{Array1, ArrayView1, ArrayView2};

use super::{SolverError, SparseSolver, Verbosity};

/// Squared column norms below this are treated as zero.
const DEGENERATE_NORM_SQ: f64 = 1e-24;

/// Coordinate-descent solver for the LASSO problem.
///
/// Basis columns with zero norm cannot carry signal; their coefficients
/// stay at zero, which is the exact minimizer for those coordinates. If
/// *every* column is zero the system is degenerate and the solve fails.
#[derive(Debug, Clone)]
pub struct CoordinateDescent {
    /// Maximum number of full coordinate sweeps per frame
    pub max_sweeps: usize,
    /// Sweep terminates once the largest coefficient change drops below this
    pub tolerance: f64,
    /// Per-solve diagnostic verbosity
    pub verbosity: Verbosity,
}

impl Default for CoordinateDescent {
    fn default() -> Self {
        Self {
            max_sweeps: 1000,
            tolerance: 1e-8,
            verbosity: Verbosity::Silent,
        }
    }
}

impl CoordinateDescent {
    /// Create a solver with explicit iteration limits.
    pub fn new(max_sweeps: usize, tolerance: f64) -> Self {
        Self {
            max_sweeps,
            tolerance,
            verbosity: Verbosity::Silent,
        }
    }

    /// Set the diagnostic verbosity.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Soft-threshold operator: shrink `value` toward zero by `threshold`.
fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

impl SparseSolver for CoordinateDescent {
    fn encode(
        &self,
        basis: ArrayView2<'_, f64>,
        frame: ArrayView1<'_, f64>,
        alpha: f64,
    ) -> Result<Array1<f64>, SolverError> {
        let size = basis.ncols();
        debug_assert_eq!(basis.nrows(), frame.len());

        let column_norms_sq: Vec<f64> = (0..size)
            .map(|j| {
                let column = basis.column(j);
                column.dot(&column)
            })
            .collect();

        if column_norms_sq.iter().all(|&norm| norm <= DEGENERATE_NORM_SQ) {
            return Err(SolverError::degenerate_basis("coordinate descent"));
        }

        let mut coefficients = Array1::zeros(size);
        let mut residual = frame.to_owned();
        let mut sweeps_run = 0;

        for sweep in 0..self.max_sweeps {
            sweeps_run = sweep + 1;
            let mut max_delta = 0.0_f64;

            for j in 0..size {
                if column_norms_sq[j] <= DEGENERATE_NORM_SQ {
                    continue;
                }
                let column = basis.column(j);
                // Partial residual correlation with column j restored.
                let rho = column.dot(&residual) + column_norms_sq[j] * coefficients[j];
                let updated = soft_threshold(rho, alpha / 2.0) / column_norms_sq[j];
                let delta: f64 = updated - coefficients[j];
                if delta != 0.0 {
                    residual.scaled_add(-delta, &column);
                    coefficients[j] = updated;
                }
                max_delta = max_delta.max(delta.abs());
            }

            if !max_delta.is_finite() {
                return Err(SolverError::non_finite("coordinate descent sweep"));
            }
            if max_delta < self.tolerance {
                break;
            }
        }

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SolverError::non_finite("coordinate descent coefficients"));
        }

        if self.verbosity == Verbosity::Progress {
            tracing::debug!(
                sweeps = sweeps_run,
                nonzero = coefficients.iter().filter(|&&c| c != 0.0).count(),
                "sparse code solved"
            );
        }

        Ok(coefficients)
    }

    fn name(&self) -> &str {
        "CoordinateDescent"
    }
}
