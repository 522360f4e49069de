//! Sparse activation matrices.
//!
//! An activation matrix holds the coefficient vectors produced by sparse
//! coding a frame collection against one codebook snapshot: `k × n`, one
//! column per frame. Activations are ephemeral and recomputed as needed,
//! never persisted apart from the codebook that produced them.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// `k × n` matrix of sparse coefficients, one column per encoded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationMatrix {
    coefficients: Array2<f64>,
}

impl ActivationMatrix {
    /// Assemble from per-frame coefficient vectors.
    pub(crate) fn from_columns(columns: Vec<Array1<f64>>) -> Self {
        debug_assert!(!columns.is_empty());
        let size = columns[0].len();
        let coefficients = Array2::from_shape_fn((size, columns.len()), |(row, col)| {
            columns[col][row]
        });
        Self { coefficients }
    }

    /// Number of codebook basis vectors (`k`).
    pub fn codebook_size(&self) -> usize {
        self.coefficients.nrows()
    }

    /// Number of encoded frames (`n`).
    pub fn num_frames(&self) -> usize {
        self.coefficients.ncols()
    }

    /// The full coefficient matrix.
    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    /// Coefficient vector for one frame.
    pub fn column(&self, frame_index: usize) -> ArrayView1<'_, f64> {
        self.coefficients.column(frame_index)
    }

    /// L1 norm of one frame's coefficients.
    pub fn column_l1_norm(&self, frame_index: usize) -> f64 {
        self.column(frame_index).iter().map(|c| c.abs()).sum()
    }

    /// Mean L1 norm across all frames.
    pub fn mean_l1_norm(&self) -> f64 {
        let total: f64 = (0..self.num_frames())
            .map(|index| self.column_l1_norm(index))
            .sum();
        total / self.num_frames() as f64
    }

    /// Fraction of coefficients with magnitude at most `tolerance`.
    pub fn sparsity(&self, tolerance: f64) -> f64 {
        let zeros = self
            .coefficients
            .iter()
            .filter(|c| c.abs() <= tolerance)
            .count();
        zeros as f64 / self.coefficients.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> ActivationMatrix {
        ActivationMatrix::from_columns(vec![array![1.0, 0.0, -2.0], array![0.0, 0.5, 0.0]])
    }

    #[test]
    fn shape_reflects_columns() {
        let activations = sample();
        assert_eq!(activations.codebook_size(), 3);
        assert_eq!(activations.num_frames(), 2);
        assert_eq!(activations.column(1)[1], 0.5);
    }

    #[test]
    fn l1_norms_are_per_frame() {
        let activations = sample();
        assert!((activations.column_l1_norm(0) - 3.0).abs() < 1e-12);
        assert!((activations.column_l1_norm(1) - 0.5).abs() < 1e-12);
        assert!((activations.mean_l1_norm() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn sparsity_counts_near_zeros() {
        let activations = sample();
        assert!((activations.sparsity(0.0) - 0.5).abs() < 1e-12);
    }
}
