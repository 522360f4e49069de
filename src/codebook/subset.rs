//! Codebook pruning by clustering and entropy ranking.
//!
//! Groups similar basis vectors with complete-linkage clustering over
//! their maximal cross-correlation scores, then keeps the highest-entropy
//! members of each cluster. The survivors carry their values unchanged
//! into a fresh codebook; the source codebook is never touched.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1};

use crate::cluster::complete_linkage_partition;
use crate::similarity::maximal_cross_correlation;

use super::error::CodebookResult;
use super::Codebook;

/// Histogram resolution for the entropy ranking.
const ENTROPY_BUCKETS: usize = 10;

/// Basis vectors per cluster when cutting the dendrogram.
const COLUMNS_PER_CLUSTER: usize = 10;

/// Fraction of each cluster kept after ranking.
const KEEP_RATIO: f64 = 0.9;

impl Codebook {
    /// Prune this codebook down to its most informative basis vectors.
    ///
    /// Clusters the `k` columns into `ceil(k / 10)` groups by maximal
    /// cross-correlation, ranks each group by empirical entropy, and
    /// keeps the top 90% (rounded up) of every group. Returns a new
    /// codebook with the surviving columns and the same `alpha`.
    pub fn most_informative_subset(&self) -> CodebookResult<Codebook> {
        let size = self.size();
        let num_clusters = div_ceil(size, COLUMNS_PER_CLUSTER);

        let mut proximity = Array2::zeros((size, size));
        for i in 0..size {
            for j in 0..i {
                let score = maximal_cross_correlation(self.column(i), self.column(j));
                proximity[[i, j]] = score;
                proximity[[j, i]] = score;
            }
        }

        let clusters = complete_linkage_partition(&proximity, num_clusters);

        let entropies: Vec<f64> = (0..size)
            .map(|index| empirical_entropy(self.column(index), ENTROPY_BUCKETS))
            .collect();

        let mut survivors = Vec::new();
        for mut cluster in clusters {
            cluster.sort_by(|&a, &b| {
                entropies[b]
                    .partial_cmp(&entropies[a])
                    .unwrap_or(Ordering::Equal)
            });
            let keep = ((cluster.len() as f64) * KEEP_RATIO).ceil() as usize;
            survivors.extend(cluster.into_iter().take(keep));
        }

        tracing::debug!(
            original = size,
            retained = survivors.len(),
            "codebook subset selected"
        );

        let columns = survivors
            .iter()
            .map(|&index| self.column(index).to_owned())
            .collect();
        Codebook::from_columns(columns, self.alpha())
    }
}

/// Shannon entropy (base 2) of a vector's value distribution.
///
/// Values are min-max scaled to [0,1] and bucketed into `num_buckets`
/// equal-width bins; the entropy of the bin occupancy is returned.
/// Constant vectors have zero entropy. Min-max scaling makes the result
/// invariant to positive rescaling, so basis-column norm drift does not
/// disturb the ranking.
pub fn empirical_entropy(values: ArrayView1<'_, f64>, num_buckets: usize) -> f64 {
    let count = values.len();
    if count == 0 || num_buckets == 0 {
        return 0.0;
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return 0.0;
    }

    let mut buckets = vec![0usize; num_buckets];
    for &value in values {
        let scaled = (value - min) / range;
        let index = ((scaled * num_buckets as f64) as usize).min(num_buckets - 1);
        buckets[index] += 1;
    }

    let mut entropy = 0.0;
    for &occupancy in &buckets {
        if occupancy > 0 {
            let probability = occupancy as f64 / count as f64;
            entropy -= probability * probability.log2();
        }
    }
    entropy
}

fn div_ceil(value: usize, divisor: usize) -> usize {
    (value + divisor - 1) / divisor
}
