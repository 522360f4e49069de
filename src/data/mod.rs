//! Frame collections and batch partitioning.
//!
//! A [`FrameCollection`] is the single input surface of the learning core:
//! an ordered set of equal-dimension windowed observations, regardless of
//! which upstream extraction produced them. Partitioning permutes the
//! collection and cuts it into contiguous, non-overlapping batches for the
//! alternating optimization.

pub mod synthetic;

use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::codebook::error::{CodebookError, CodebookResult};

/// A fixed-length windowed observation.
pub type Frame = Array1<f64>;

/// How a collection is cut into batches for one learning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionPolicy {
    /// Split into this many roughly-equal batches
    NumberPartitions(usize),
    /// Split into batches of this many frames, last batch may be smaller
    PartitionSize(usize),
}

impl PartitionPolicy {
    /// Parse a policy from its external string tag.
    ///
    /// Recognized tags are `"numberPartitions"` and `"partitionSize"`,
    /// compared case-insensitively. Anything else is rejected.
    pub fn from_tag(style: &str, option: usize) -> CodebookResult<Self> {
        let policy = if style.eq_ignore_ascii_case("numberPartitions") {
            PartitionPolicy::NumberPartitions(option)
        } else if style.eq_ignore_ascii_case("partitionSize") {
            PartitionPolicy::PartitionSize(option)
        } else {
            return Err(CodebookError::invalid_config(
                "partition_style",
                style,
                "must be 'numberPartitions' or 'partitionSize'",
            ));
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check the option value is usable.
    pub fn validate(&self) -> CodebookResult<()> {
        let (parameter, option) = match self {
            PartitionPolicy::NumberPartitions(k) => ("numberPartitions", *k),
            PartitionPolicy::PartitionSize(s) => ("partitionSize", *s),
        };
        if option == 0 {
            return Err(CodebookError::invalid_config(
                parameter,
                "0",
                "must be > 0",
            ));
        }
        Ok(())
    }

    /// Batch sizes for a collection of `n` frames. Sizes are positive and
    /// sum to exactly `n`.
    fn slab_sizes(&self, n: usize) -> Vec<usize> {
        match *self {
            PartitionPolicy::NumberPartitions(k) => {
                if k >= n {
                    return vec![1; n];
                }
                let base = n / k;
                let remainder = n % k;
                (0..k)
                    .map(|i| if i < remainder { base + 1 } else { base })
                    .collect()
            }
            PartitionPolicy::PartitionSize(s) => {
                if s >= n {
                    return vec![n];
                }
                let full = n / s;
                let tail = n % s;
                let mut sizes = vec![s; full];
                if tail > 0 {
                    sizes.push(tail);
                }
                sizes
            }
        }
    }
}

/// Ordered collection of equal-dimension frames.
///
/// Immutable once built. `len() ≥ 1` and every frame shares `dimension()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameCollection {
    frames: Vec<Frame>,
    dimension: usize,
}

impl FrameCollection {
    /// Build a collection from owned frames.
    ///
    /// Fails on an empty vector or on frames of differing dimension.
    pub fn new(frames: Vec<Frame>) -> CodebookResult<Self> {
        let dimension = frames
            .first()
            .map(|frame| frame.len())
            .ok_or_else(|| CodebookError::empty_collection("frames"))?;
        if dimension == 0 {
            return Err(CodebookError::invalid_config(
                "frame dimension",
                "0",
                "frames must be non-empty vectors",
            ));
        }
        for (index, frame) in frames.iter().enumerate() {
            if frame.len() != dimension {
                return Err(CodebookError::dimension_mismatch(
                    dimension,
                    frame.len(),
                    format!("frame {}", index),
                ));
            }
        }
        Ok(Self { frames, dimension })
    }

    /// Build a collection from a `d × n` matrix whose columns are frames.
    pub fn from_matrix(matrix: &Array2<f64>) -> CodebookResult<Self> {
        if matrix.ncols() == 0 {
            return Err(CodebookError::empty_collection("frame matrix columns"));
        }
        let frames = matrix
            .columns()
            .into_iter()
            .map(|column| column.to_owned())
            .collect();
        Self::new(frames)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false: construction requires at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Shared frame dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// View of one frame.
    pub fn frame(&self, index: usize) -> ArrayView1<'_, f64> {
        self.frames[index].view()
    }

    /// All frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Collect into a `d × n` matrix with one column per frame.
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.dimension, self.len()), |(row, col)| {
            self.frames[col][row]
        })
    }

    /// Permute the collection and cut it into batches per `policy`.
    ///
    /// Batches are contiguous slabs of the permuted order: non-overlapping,
    /// jointly covering every frame exactly once.
    pub fn partition<R: Rng + ?Sized>(
        &self,
        policy: PartitionPolicy,
        rng: &mut R,
    ) -> CodebookResult<Vec<FrameCollection>> {
        policy.validate()?;

        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        let mut batches = Vec::new();
        let mut start = 0;
        for size in policy.slab_sizes(self.len()) {
            let frames = order[start..start + size]
                .iter()
                .map(|&index| self.frames[index].clone())
                .collect();
            batches.push(FrameCollection {
                frames,
                dimension: self.dimension,
            });
            start += size;
        }
        Ok(batches)
    }
}
