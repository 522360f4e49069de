//! The sparse-coding codebook: basis matrix, coding, and refitting.
//!
//! A [`Codebook`] owns a `d × k` basis matrix and the L1 weight `alpha`.
//! It is initialized with random zero-mean, unit-norm columns, encoded
//! against with [`Codebook::activate`], and refit in place during
//! learning. Basis columns are not re-normalized after refits, so their
//! norms drift away from 1 across passes; magnitude migrates into the
//! basis rather than the activations.

pub mod activation;
pub mod error;
pub mod learning;
pub mod subset;

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::checkpoint::{CheckpointError, Checkpointable, CODEBOOK_SNAPSHOT_VERSION};
use crate::data::FrameCollection;
use crate::solver::coordinate_descent::CoordinateDescent;
use crate::solver::{SolverError, SparseSolver};

use activation::ActivationMatrix;
use error::{CodebookError, CodebookResult};

/// Singular values below this are treated as zero in the refit solve.
const REFIT_SVD_EPSILON: f64 = 1e-10;

/// A learned dictionary of basis vectors plus its L1 weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Codebook {
    /// `d × k` matrix, one basis vector per column
    basis: Array2<f64>,
    /// L1 regularization weight used for coding
    alpha: f64,
}

impl Codebook {
    /// Create a random codebook from a seed.
    ///
    /// Each column is drawn uniformly in [0,1), mean-centered, and scaled
    /// to unit L2 norm. Deterministic per seed.
    pub fn from_seed(
        dimension: usize,
        size: usize,
        alpha: f64,
        seed: u64,
    ) -> CodebookResult<Self> {
        if dimension == 0 {
            return Err(CodebookError::invalid_config(
                "dimension",
                "0",
                "must be > 0",
            ));
        }
        if size == 0 {
            return Err(CodebookError::invalid_config("size", "0", "must be > 0"));
        }
        validate_alpha(alpha)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut basis = Array2::zeros((dimension, size));
        for mut column in basis.columns_mut() {
            let raw: Array1<f64> = Array1::from_shape_fn(dimension, |_| rng.gen::<f64>());
            let mean = raw.sum() / dimension as f64;
            let centered = raw.mapv(|value| value - mean);
            let norm = centered.dot(&centered).sqrt();
            column.assign(&centered.mapv(|value| value / norm));
        }

        Ok(Self { basis, alpha })
    }

    /// Build a codebook from explicit basis columns, keeping `alpha`.
    ///
    /// Used by subset selection and checkpoint loading.
    pub(crate) fn from_columns(columns: Vec<Array1<f64>>, alpha: f64) -> CodebookResult<Self> {
        let dimension = columns
            .first()
            .map(|column| column.len())
            .ok_or_else(|| CodebookError::empty_collection("basis columns"))?;
        for (index, column) in columns.iter().enumerate() {
            if column.len() != dimension {
                return Err(CodebookError::dimension_mismatch(
                    dimension,
                    column.len(),
                    format!("basis column {}", index),
                ));
            }
        }
        validate_alpha(alpha)?;

        let basis = Array2::from_shape_fn((dimension, columns.len()), |(row, col)| {
            columns[col][row]
        });
        Ok(Self { basis, alpha })
    }

    /// Dimension `d` of the basis vectors.
    pub fn dimension(&self) -> usize {
        self.basis.nrows()
    }

    /// Number of basis vectors `k`.
    pub fn size(&self) -> usize {
        self.basis.ncols()
    }

    /// The L1 regularization weight.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The `d × k` basis matrix.
    pub fn basis(&self) -> &Array2<f64> {
        &self.basis
    }

    /// View of one basis vector.
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.basis.column(index)
    }

    /// Sparse-code a frame collection with the default solver.
    ///
    /// Produces a `k × n` activation matrix; the codebook is not mutated.
    pub fn activate(&self, frames: &FrameCollection) -> CodebookResult<ActivationMatrix> {
        self.activate_with(frames, &CoordinateDescent::default())
    }

    /// Sparse-code a frame collection with a caller-supplied solver.
    ///
    /// Frames are solved independently and in parallel. Any frame's
    /// solver failure aborts the whole call.
    pub fn activate_with<S: SparseSolver>(
        &self,
        frames: &FrameCollection,
        solver: &S,
    ) -> CodebookResult<ActivationMatrix> {
        if frames.dimension() != self.dimension() {
            return Err(CodebookError::dimension_mismatch(
                self.dimension(),
                frames.dimension(),
                "frame activation",
            ));
        }

        let columns = frames
            .frames()
            .par_iter()
            .map(|frame| solver.encode(self.basis.view(), frame.view(), self.alpha))
            .collect::<Result<Vec<Array1<f64>>, SolverError>>()?;

        Ok(ActivationMatrix::from_columns(columns))
    }

    /// Refit the basis to a batch, holding the batch activations fixed.
    ///
    /// Solves `min_D ‖X − D·A‖₂²` through the transposed system
    /// `Aᵗ·Dᵗ = Xᵗ` with an SVD least-squares solve, then replaces the
    /// basis with the solution. Columns are not re-normalized.
    pub(crate) fn refit_least_squares(
        &mut self,
        batch: &FrameCollection,
        activations: &ActivationMatrix,
    ) -> CodebookResult<()> {
        if batch.dimension() != self.dimension() {
            return Err(CodebookError::dimension_mismatch(
                self.dimension(),
                batch.dimension(),
                "refit batch",
            ));
        }
        if activations.codebook_size() != self.size() {
            return Err(CodebookError::dimension_mismatch(
                self.size(),
                activations.codebook_size(),
                "refit activations",
            ));
        }
        if activations.num_frames() != batch.len() {
            return Err(CodebookError::dimension_mismatch(
                batch.len(),
                activations.num_frames(),
                "refit activation count",
            ));
        }

        let dimension = self.dimension();
        let size = self.size();
        let batch_len = batch.len();

        let data = batch.to_matrix();
        let coefficients = activations.coefficients();

        // ndarray iterates views in logical row-major order, so the
        // transposed views feed nalgebra's row iterator directly.
        let activations_t = DMatrix::from_row_iterator(
            batch_len,
            size,
            coefficients.t().iter().copied(),
        );
        let data_t =
            DMatrix::from_row_iterator(batch_len, dimension, data.t().iter().copied());

        let svd = activations_t.svd(true, true);
        let basis_t = svd
            .solve(&data_t, REFIT_SVD_EPSILON)
            .map_err(|details| CodebookError::numerical("least-squares refit", details))?;

        if basis_t.iter().any(|value| !value.is_finite()) {
            return Err(CodebookError::numerical(
                "least-squares refit",
                "solution contains non-finite values",
            ));
        }

        self.basis = Array2::from_shape_fn((dimension, size), |(row, col)| basis_t[(col, row)]);
        Ok(())
    }

    /// Average regularized reconstruction error of `frames` under the
    /// given activations.
    ///
    /// `mean over frames of ‖x − D·a‖₂² + alpha·‖a‖₁`, the convergence
    /// criterion for learning.
    pub fn average_regularized_reconstruction_error(
        &self,
        frames: &FrameCollection,
        activations: &ActivationMatrix,
    ) -> CodebookResult<f64> {
        if frames.dimension() != self.dimension() {
            return Err(CodebookError::dimension_mismatch(
                self.dimension(),
                frames.dimension(),
                "reconstruction error frames",
            ));
        }
        if activations.codebook_size() != self.size()
            || activations.num_frames() != frames.len()
        {
            return Err(CodebookError::dimension_mismatch(
                frames.len(),
                activations.num_frames(),
                "reconstruction error activations",
            ));
        }

        let total: f64 = (0..frames.len())
            .map(|index| {
                let reconstruction = self.basis.dot(&activations.column(index));
                let residual = &frames.frame(index).to_owned() - &reconstruction;
                residual.dot(&residual) + self.alpha * activations.column_l1_norm(index)
            })
            .sum();

        Ok(total / frames.len() as f64)
    }
}

fn validate_alpha(alpha: f64) -> CodebookResult<()> {
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(CodebookError::invalid_config(
            "alpha",
            alpha.to_string(),
            "must be finite and >= 0",
        ));
    }
    Ok(())
}

// Versioned binary persistence: the storage location is always supplied
// by the caller.
impl Checkpointable for Codebook {
    fn save_checkpoint<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let snapshot = CodebookSnapshot {
            version: CODEBOOK_SNAPSHOT_VERSION,
            alpha: self.alpha,
            basis: self.basis.clone(),
        };
        Self::write_snapshot(&snapshot, path)
    }

    fn load_checkpoint<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CheckpointError> {
        let snapshot: CodebookSnapshot = Self::read_snapshot(path)?;
        if snapshot.version != CODEBOOK_SNAPSHOT_VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: CODEBOOK_SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }
        if snapshot.basis.nrows() == 0 || snapshot.basis.ncols() == 0 {
            return Err(CheckpointError::InvalidFormat(
                "codebook snapshot has an empty basis matrix".into(),
            ));
        }
        if !snapshot.alpha.is_finite() || snapshot.alpha < 0.0 {
            return Err(CheckpointError::InvalidFormat(
                "codebook snapshot has an invalid alpha".into(),
            ));
        }
        Ok(Self {
            basis: snapshot.basis,
            alpha: snapshot.alpha,
        })
    }
}

/// On-disk form of a codebook.
#[derive(serde::Serialize, serde::Deserialize)]
struct CodebookSnapshot {
    version: u32,
    alpha: f64,
    basis: Array2<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn initial_columns_are_zero_mean_unit_norm() {
        let codebook = Codebook::from_seed(24, 16, 0.1, 42).unwrap();

        for column in codebook.basis().columns() {
            let mean = column.sum() / column.len() as f64;
            let norm = column.dot(&column).sqrt();
            assert!(mean.abs() < 1e-9);
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn initialization_is_deterministic_per_seed() {
        let first = Codebook::from_seed(10, 4, 0.1, 7).unwrap();
        let second = Codebook::from_seed(10, 4, 0.1, 7).unwrap();
        let different = Codebook::from_seed(10, 4, 0.1, 8).unwrap();

        assert_eq!(first.basis(), second.basis());
        assert_ne!(first.basis(), different.basis());
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(Codebook::from_seed(0, 4, 0.1, 1).is_err());
        assert!(Codebook::from_seed(10, 0, 0.1, 1).is_err());
        assert!(Codebook::from_seed(10, 4, -0.5, 1).is_err());
    }

    #[test]
    fn activation_requires_matching_dimension() {
        let codebook = Codebook::from_seed(6, 3, 0.1, 1).unwrap();
        let frames =
            FrameCollection::new(vec![Array1::zeros(5)]).unwrap();

        let result = codebook.activate(&frames);
        assert!(matches!(
            result,
            Err(CodebookError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn activation_is_deterministic() {
        let codebook = Codebook::from_seed(8, 4, 0.05, 3).unwrap();
        let frames = FrameCollection::new(vec![
            Array1::from_shape_fn(8, |i| (i as f64 * 0.37).sin()),
            Array1::from_shape_fn(8, |i| (i as f64 * 0.71).cos()),
        ])
        .unwrap();

        let first = codebook.activate(&frames).unwrap();
        let second = codebook.activate(&frames).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn refit_recovers_exact_generating_basis() {
        // X = D·A with full-rank A: the least-squares solution is D itself.
        let generating = array![[1.0, 0.0], [0.0, 1.0], [1.0, -1.0]];
        let coefficients = vec![
            array![1.0, 0.0],
            array![0.0, 1.0],
            array![2.0, 1.0],
        ];
        let activations = ActivationMatrix::from_columns(coefficients.clone());
        let frames = FrameCollection::new(
            coefficients
                .iter()
                .map(|a| generating.dot(a))
                .collect(),
        )
        .unwrap();

        let mut codebook = Codebook::from_seed(3, 2, 0.0, 99).unwrap();
        codebook.refit_least_squares(&frames, &activations).unwrap();

        for (fitted, expected) in codebook.basis().iter().zip(generating.iter()) {
            assert!((fitted - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn refit_lets_column_norms_drift() {
        // Halved activations force the refit basis to twice the norm.
        let generating = array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
        let true_coefficients = vec![array![1.0, 0.0], array![0.0, 1.0], array![1.0, 1.0]];
        let frames = FrameCollection::new(
            true_coefficients
                .iter()
                .map(|a| generating.dot(a))
                .collect(),
        )
        .unwrap();
        let halved = ActivationMatrix::from_columns(
            true_coefficients.iter().map(|a| a * 0.5).collect(),
        );

        let mut codebook = Codebook::from_seed(3, 2, 0.0, 5).unwrap();
        codebook.refit_least_squares(&frames, &halved).unwrap();

        for column in codebook.basis().columns() {
            let norm = column.dot(&column).sqrt();
            assert!((norm - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn reconstruction_error_matches_hand_computation() {
        let codebook =
            Codebook::from_columns(vec![array![1.0, 0.0], array![0.0, 1.0]], 0.1).unwrap();
        let frames = FrameCollection::new(vec![array![1.0, 0.0]]).unwrap();
        let activations = ActivationMatrix::from_columns(vec![array![1.0, 0.0]]);

        let error = codebook
            .average_regularized_reconstruction_error(&frames, &activations)
            .unwrap();

        // Perfect reconstruction leaves only the L1 term: 0.1 * 1.0.
        assert!((error - 0.1).abs() < 1e-12);
    }
}
