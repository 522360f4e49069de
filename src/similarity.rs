//! Maximal cross-correlation between basis vectors.
//!
//! A lag-maximized dot-product similarity used as the proximity score for
//! clustering basis vectors. It is not a metric: it is not guaranteed
//! non-negative-definite and must only be used as a monotone proximity
//! score.

use ndarray::ArrayView1;

/// Maximal cross-correlation of two equal-length vectors.
///
/// For every lag `t` in `[0, 2n]` the correlation is
/// `Σ v1[τ]·v2[n+τ−t]` with `τ` ranging over the valid overlap
/// `[max(0, t−n), min(n, t))`; the result is the maximum over all lags,
/// floored at zero.
///
/// # Panics
///
/// Panics in debug builds when the vectors differ in length.
pub fn maximal_cross_correlation(v1: ArrayView1<'_, f64>, v2: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(v1.len(), v2.len());
    let n = v1.len();
    let mut max_correlation = 0.0_f64;

    for t in 0..=2 * n {
        let lower = t.saturating_sub(n);
        let upper = n.min(t);
        let mut correlation = 0.0;
        for tau in lower..upper {
            correlation += v1[tau] * v2[n + tau - t];
        }
        if correlation > max_correlation {
            max_correlation = correlation;
        }
    }

    max_correlation
}
