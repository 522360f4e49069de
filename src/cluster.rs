//! Complete-linkage agglomerative clustering over a proximity matrix.
//!
//! Starts from singletons and repeatedly merges the pair of clusters with
//! the smallest complete linkage (the maximum pairwise proximity between
//! their members) until the requested number of clusters remains. The
//! proximity matrix is taken at face value; callers choose what the
//! scores mean.

use ndarray::Array2;

/// Partition `proximity.nrows()` items into `num_clusters` clusters.
///
/// `proximity` must be square and symmetric. Requesting at least as many
/// clusters as items yields singletons. Member indices within each
/// cluster are returned sorted ascending.
pub fn complete_linkage_partition(
    proximity: &Array2<f64>,
    num_clusters: usize,
) -> Vec<Vec<usize>> {
    debug_assert_eq!(proximity.nrows(), proximity.ncols());
    let n = proximity.nrows();
    let target = num_clusters.max(1);

    let mut clusters: Vec<Vec<usize>> = (0..n).map(|index| vec![index]).collect();

    while clusters.len() > target {
        let mut best_pair = (0, 1);
        let mut best_linkage = f64::INFINITY;

        for a in 0..clusters.len() {
            for b in (a + 1)..clusters.len() {
                let linkage = complete_linkage(proximity, &clusters[a], &clusters[b]);
                if linkage < best_linkage {
                    best_linkage = linkage;
                    best_pair = (a, b);
                }
            }
        }

        let (a, b) = best_pair;
        let absorbed = clusters.remove(b);
        clusters[a].extend(absorbed);
    }

    for cluster in &mut clusters {
        cluster.sort_unstable();
    }
    clusters
}

/// Complete linkage: the worst-case proximity between two clusters.
fn complete_linkage(proximity: &Array2<f64>, left: &[usize], right: &[usize]) -> f64 {
    let mut linkage = f64::NEG_INFINITY;
    for &i in left {
        for &j in right {
            let value = proximity[[i, j]];
            if value > linkage {
                linkage = value;
            }
        }
    }
    linkage
}
