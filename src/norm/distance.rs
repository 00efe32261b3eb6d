//! Squared Mahalanobis distance of 2-D points from their own centroid

use ndarray::{Array2, Axis};

/// Determinants below this fraction of the variance product count as singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Squared Mahalanobis distance of each `(f1[i], f2[i])` from the group centroid
///
/// Uses the sample covariance (N-1 divisor) of the group itself. Returns
/// `None` when the covariance is undefined: fewer than 3 points, mismatched
/// lengths, or a singular matrix (constant or collinear points).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mahalanobis_sq(f1: &[f64], f2: &[f64]) -> Option<Vec<f64>> {
    let n = f1.len();
    if n < 3 || f2.len() != n {
        return None;
    }

    let flat: Vec<f64> = f1.iter().zip(f2).flat_map(|(&a, &b)| [a, b]).collect();
    let data = Array2::from_shape_vec((n, 2), flat).ok()?;
    let centroid = data.mean_axis(Axis(0))?;
    let centered = &data - &centroid;

    let cov = centered.t().dot(&centered) / (n - 1) as f64;
    let (a, b, c, d) = (cov[[0, 0]], cov[[0, 1]], cov[[1, 0]], cov[[1, 1]]);
    let det = a * d - b * c;
    if a <= 0.0 || d <= 0.0 || det <= SINGULAR_TOLERANCE * a * d {
        return None;
    }

    let inv = ndarray::arr2(&[[d / det, -b / det], [-c / det, a / det]]);
    let weighted = centered.dot(&inv);
    let distances = (&weighted * &centered).sum_axis(Axis(1));

    Some(distances.to_vec())
}
