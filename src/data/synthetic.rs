//! Synthetic frame generation for validation experiments.
//!
//! Builds frame collections as sparse linear combinations of a hidden
//! random basis plus noise, so learning runs can be checked against a
//! known generating dictionary.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::FrameCollection;
use crate::codebook::error::{CodebookError, CodebookResult};

/// Configuration for synthetic dataset generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Frame dimension
    pub dimension: usize,
    /// Number of frames to generate
    pub num_frames: usize,
    /// Number of hidden basis vectors
    pub basis_size: usize,
    /// Nonzero coefficients per frame
    pub active_components: usize,
    /// Uniform noise amplitude added per element
    pub noise_level: f64,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            dimension: 20,
            num_frames: 100,
            basis_size: 8,
            active_components: 3,
            noise_level: 0.01,
            seed: 42,
        }
    }
}

/// Synthetic dataset with its hidden generating basis
pub struct SyntheticDataset {
    pub frames: FrameCollection,
    /// The `d × k` basis the frames were mixed from
    pub generating_basis: Array2<f64>,
    pub config: SyntheticConfig,
}

impl SyntheticDataset {
    /// Generate a dataset of sparse basis combinations.
    pub fn generate(config: SyntheticConfig) -> CodebookResult<Self> {
        if config.dimension == 0 || config.num_frames == 0 || config.basis_size == 0 {
            return Err(CodebookError::invalid_config(
                "synthetic dataset",
                "0",
                "dimension, num_frames and basis_size must be > 0",
            ));
        }
        if config.active_components == 0 || config.active_components > config.basis_size {
            return Err(CodebookError::invalid_config(
                "active_components",
                config.active_components.to_string(),
                "must be in 1..=basis_size",
            ));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);

        // Hidden basis: zero-mean, unit-norm columns like a fresh codebook.
        let mut basis = Array2::zeros((config.dimension, config.basis_size));
        for mut column in basis.columns_mut() {
            let raw: Array1<f64> =
                Array1::from_shape_fn(config.dimension, |_| rng.gen::<f64>());
            let mean = raw.sum() / config.dimension as f64;
            let centered = raw.mapv(|value| value - mean);
            let norm = centered.dot(&centered).sqrt();
            column.assign(&centered.mapv(|value| value / norm));
        }

        let mut indices: Vec<usize> = (0..config.basis_size).collect();
        let mut frames = Vec::with_capacity(config.num_frames);
        for _ in 0..config.num_frames {
            indices.shuffle(&mut rng);
            let mut frame = Array1::zeros(config.dimension);
            for &component in indices.iter().take(config.active_components) {
                let magnitude = rng.gen_range(0.5..1.5);
                let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
                frame.scaled_add(sign * magnitude, &basis.column(component));
            }
            if config.noise_level > 0.0 {
                frame.mapv_inplace(|value| {
                    value + rng.gen_range(-config.noise_level..config.noise_level)
                });
            }
            frames.push(frame);
        }

        Ok(Self {
            frames: FrameCollection::new(frames)?,
            generating_basis: basis,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic_per_seed() {
        let config = SyntheticConfig {
            num_frames: 10,
            ..Default::default()
        };
        let first = SyntheticDataset::generate(config.clone()).unwrap();
        let second = SyntheticDataset::generate(config).unwrap();

        assert_eq!(first.frames, second.frames);
        assert_eq!(first.generating_basis, second.generating_basis);
    }

    #[test]
    fn generated_dimensions_match_config() {
        let config = SyntheticConfig {
            dimension: 12,
            num_frames: 30,
            basis_size: 5,
            active_components: 2,
            ..Default::default()
        };
        let dataset = SyntheticDataset::generate(config).unwrap();

        assert_eq!(dataset.frames.len(), 30);
        assert_eq!(dataset.frames.dimension(), 12);
        assert_eq!(dataset.generating_basis.dim(), (12, 5));
    }

    #[test]
    fn hidden_basis_columns_are_normalized() {
        let dataset = SyntheticDataset::generate(SyntheticConfig::default()).unwrap();

        for column in dataset.generating_basis.columns() {
            let mean = column.sum() / column.len() as f64;
            let norm = column.dot(&column).sqrt();
            assert!(mean.abs() < 1e-9);
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_too_many_active_components() {
        let config = SyntheticConfig {
            basis_size: 4,
            active_components: 5,
            ..Default::default()
        };
        assert!(SyntheticDataset::generate(config).is_err());
    }

    #[test]
    fn zero_noise_is_supported() {
        let config = SyntheticConfig {
            noise_level: 0.0,
            num_frames: 5,
            ..Default::default()
        };
        assert!(SyntheticDataset::generate(config).is_ok());
    }
}
