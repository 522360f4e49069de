//! Alternating-minimization codebook learning.
//!
//! One pass permutes and partitions the frame collection, then walks the
//! batches in order: sparse-code a batch against the current basis, refit
//! the basis on that batch, move on. Later batches therefore see a basis
//! already updated by earlier ones; that incremental update is the
//! intended behavior, not an accident. After the pass the whole
//! collection is re-activated to measure the average regularized
//! reconstruction error, and the improvement over the previous pass
//! decides convergence.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::data::{FrameCollection, PartitionPolicy};
use crate::solver::coordinate_descent::CoordinateDescent;
use crate::solver::SparseSolver;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::{CodebookError, CodebookResult};
use super::Codebook;

/// Learning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnConfig {
    /// How the collection is cut into batches each pass
    pub partition: PartitionPolicy,
    /// Error improvement below this ends the loop
    pub convergence_threshold: f64,
    /// L1 regularization weight for the coding steps
    pub alpha: f64,
    /// Hard bound on passes; exhausting it is a reported non-convergence
    pub max_passes: usize,
    /// Seed for the per-pass permutations (and `Codebook::learn` init)
    pub seed: u64,
}

impl Default for LearnConfig {
    fn default() -> Self {
        Self {
            partition: PartitionPolicy::PartitionSize(50),
            convergence_threshold: 0.01,
            alpha: 0.1,
            max_passes: 50,
            seed: 42,
        }
    }
}

impl LearnConfig {
    /// Validate all parameters, failing fast on the first bad one.
    pub fn validate(&self) -> CodebookResult<()> {
        self.partition.validate()?;
        if !self.convergence_threshold.is_finite() || self.convergence_threshold <= 0.0 {
            return Err(CodebookError::invalid_config(
                "convergence_threshold",
                self.convergence_threshold.to_string(),
                "must be finite and > 0",
            ));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(CodebookError::invalid_config(
                "alpha",
                self.alpha.to_string(),
                "must be finite and >= 0",
            ));
        }
        if self.max_passes == 0 {
            return Err(CodebookError::invalid_config(
                "max_passes",
                "0",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

/// Metrics for a single refinement pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassMetrics {
    pub pass: usize,
    /// Average regularized reconstruction error after this pass
    pub error: f64,
    /// Drop versus the previous pass; `None` on the first pass
    pub improvement: Option<f64>,
    pub num_batches: usize,
    pub elapsed_ms: u128,
}

/// Complete learning outcome
#[derive(Debug, Clone, Serialize)]
pub struct LearnResult {
    pub pass_metrics: Vec<PassMetrics>,
    /// Error after the final pass
    pub final_error: f64,
    /// Pass index at which convergence was reached; `None` means the
    /// pass bound was exhausted and the caller decides whether to accept
    /// the codebook as-is
    pub converged_pass: Option<usize>,
}

impl LearnResult {
    pub fn is_converged(&self) -> bool {
        self.converged_pass.is_some()
    }
}

impl Codebook {
    /// Learn a codebook from scratch: random init, then refinement.
    ///
    /// The factory entry point for callers that only hold frames.
    pub fn learn(
        frames: &FrameCollection,
        size: usize,
        config: &LearnConfig,
    ) -> CodebookResult<(Self, LearnResult)> {
        let mut codebook =
            Codebook::from_seed(frames.dimension(), size, config.alpha, config.seed)?;
        let result = codebook.learn_unlabeled(frames, config)?;
        Ok((codebook, result))
    }

    /// Refine this codebook against unlabeled frames with the default
    /// solver.
    pub fn learn_unlabeled(
        &mut self,
        frames: &FrameCollection,
        config: &LearnConfig,
    ) -> CodebookResult<LearnResult> {
        self.learn_unlabeled_with(frames, config, &CoordinateDescent::default())
    }

    /// Refine this codebook against unlabeled frames.
    ///
    /// Runs alternating passes until the error improvement drops below
    /// the threshold or `max_passes` is exhausted. A solve failure in
    /// any batch aborts the call; nothing from a failed pass is applied
    /// beyond the batches already refit.
    pub fn learn_unlabeled_with<S: SparseSolver>(
        &mut self,
        frames: &FrameCollection,
        config: &LearnConfig,
        solver: &S,
    ) -> CodebookResult<LearnResult> {
        config.validate()?;
        if frames.dimension() != self.dimension() {
            return Err(CodebookError::dimension_mismatch(
                self.dimension(),
                frames.dimension(),
                "learning frames",
            ));
        }

        self.alpha = config.alpha;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut previous: Option<f64> = None;
        let mut pass_metrics = Vec::new();
        let mut converged_pass = None;

        for pass in 0..config.max_passes {
            let pass_start = Instant::now();

            let batches = frames.partition(config.partition, &mut rng)?;
            let num_batches = batches.len();
            for batch in &batches {
                let batch_activations = self.activate_with(batch, solver)?;
                self.refit_least_squares(batch, &batch_activations)?;
            }

            let activations = self.activate_with(frames, solver)?;
            let current = self.average_regularized_reconstruction_error(frames, &activations)?;
            let improvement = previous.map(|last| last - current);

            match improvement {
                Some(step) => tracing::info!(
                    pass,
                    error = current,
                    improvement = step,
                    "codebook refinement pass complete"
                ),
                None => tracing::info!(
                    pass,
                    error = current,
                    "initial codebook refinement pass complete"
                ),
            }

            pass_metrics.push(PassMetrics {
                pass,
                error: current,
                improvement,
                num_batches,
                elapsed_ms: pass_start.elapsed().as_millis(),
            });

            match improvement {
                Some(step) if (0.0..config.convergence_threshold).contains(&step) => {
                    converged_pass = Some(pass);
                    break;
                }
                _ => previous = Some(current),
            }
        }

        let final_error = pass_metrics
            .last()
            .map(|metrics| metrics.error)
            .unwrap_or(f64::INFINITY);
        if converged_pass.is_none() {
            tracing::warn!(
                max_passes = config.max_passes,
                final_error,
                "codebook learning exhausted its pass bound without converging"
            );
        }

        Ok(LearnResult {
            pass_metrics,
            final_error,
            converged_pass,
        })
    }
}
