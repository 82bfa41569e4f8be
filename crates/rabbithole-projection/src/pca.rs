//! Centered PCA of the vector history onto its top three components.
//!
//! Mean-centering is on, scaling is off: each embedding dimension keeps its
//! native variance. The eigenproblem is solved on whichever symmetric
//! matrix is smaller: the n×n Gram matrix when the history is shorter
//! than the embedding dimension (the usual case), the dim×dim covariance
//! matrix otherwise. Both yield the same scores.

use ndarray::Array2;

use rabbithole_core::{ProjectionRecord, VectorRecord};
use thiserror::Error;

use crate::eigen::eigh;

/// Eigenvalues below this fraction of the leading eigenvalue (or below an
/// absolute floor) are treated as numerically zero variance: their axes are
/// zero-filled instead of amplifying roundoff into coordinates.
const RELATIVE_VARIANCE_EPS: f64 = 1e-9;
const ABSOLUTE_VARIANCE_EPS: f64 = 1e-12;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("vector at step {step} has dimension {got}, expected {expected}")]
    DimensionMismatch {
        step: u64,
        expected: usize,
        got: usize,
    },

    #[error("vector at step {step} contains a non-finite value")]
    NonFinite { step: u64 },
}

/// Project every record onto the top-k (k ≤ 3) principal components of the
/// whole history.
///
/// - empty input → empty output
/// - a single record centers to the origin: `xyz = [0, 0, 0]`
/// - components with no real variance (collinear or duplicate vectors,
///   n < 4) are zero-filled, never NaN
/// - output preserves input order; `step` and `timestamp` pass through
pub fn project(records: &[VectorRecord]) -> Result<Vec<ProjectionRecord>, ProjectionError> {
    let n = records.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let dim = records[0].vector.len();
    for rec in records {
        if rec.vector.len() != dim {
            return Err(ProjectionError::DimensionMismatch {
                step: rec.step,
                expected: dim,
                got: rec.vector.len(),
            });
        }
        if rec.vector.iter().any(|x| !x.is_finite()) {
            return Err(ProjectionError::NonFinite { step: rec.step });
        }
    }

    let centered = centered_matrix(records, n, dim);
    let scores = if n <= dim {
        gram_scores(&centered)
    } else {
        covariance_scores(&centered)
    };

    Ok(records
        .iter()
        .enumerate()
        .map(|(row, rec)| {
            let mut xyz = [0.0f64; 3];
            for (axis, column) in scores.iter().enumerate() {
                xyz[axis] = column[row];
            }
            ProjectionRecord {
                step: rec.step,
                timestamp: rec.timestamp.clone(),
                xyz,
            }
        })
        .collect())
}

/// Row-per-record matrix with the column means subtracted.
fn centered_matrix(records: &[VectorRecord], n: usize, dim: usize) -> Array2<f64> {
    let mut x = Array2::<f64>::zeros((n, dim));
    for (row, rec) in records.iter().enumerate() {
        for (col, &value) in rec.vector.iter().enumerate() {
            x[[row, col]] = f64::from(value);
        }
    }
    for col in 0..dim {
        let mean = (0..n).map(|row| x[[row, col]]).sum::<f64>() / n as f64;
        for row in 0..n {
            x[[row, col]] -= mean;
        }
    }
    x
}

/// PCA scores via the n×n Gram matrix `Xc·Xcᵀ`.
///
/// For centered `Xc = UΣVᵀ`, the Gram eigenvectors are the columns of `U`
/// with eigenvalues `σ²`, so the score column for component j is simply
/// `u_j · σ_j`; the right singular vectors are never materialized, except
/// to fix the sign convention.
fn gram_scores(centered: &Array2<f64>) -> Vec<Vec<f64>> {
    let n = centered.nrows();
    let gram = centered.dot(&centered.t());
    let (eigenvalues, eigenvectors) = eigh(gram);

    let mut scores = Vec::new();
    for (j, &lambda) in eigenvalues.iter().enumerate().take(3) {
        if is_trivial(lambda, eigenvalues[0]) {
            break;
        }
        let sigma = lambda.sqrt();
        let mut column: Vec<f64> = (0..n).map(|row| eigenvectors[[row, j]] * sigma).collect();

        // Sign convention: the loading's largest-magnitude entry is positive.
        // loading_j ∝ Xcᵀ·u_j, so its signs match Xcᵀ·column.
        let loading: Vec<f64> = (0..centered.ncols())
            .map(|col| (0..n).map(|row| centered[[row, col]] * column[row]).sum())
            .collect();
        if dominant_is_negative(&loading) {
            for v in column.iter_mut() {
                *v = -*v;
            }
        }
        scores.push(column);
    }
    scores
}

/// PCA scores via the dim×dim scatter matrix `Xcᵀ·Xc` (used when the
/// history outgrows the embedding dimension).
fn covariance_scores(centered: &Array2<f64>) -> Vec<Vec<f64>> {
    let n = centered.nrows();
    let dim = centered.ncols();
    let scatter = centered.t().dot(centered);
    let (eigenvalues, eigenvectors) = eigh(scatter);

    let mut scores = Vec::new();
    for (j, &lambda) in eigenvalues.iter().enumerate().take(3) {
        if is_trivial(lambda, eigenvalues[0]) {
            break;
        }
        let mut axis: Vec<f64> = (0..dim).map(|row| eigenvectors[[row, j]]).collect();
        if dominant_is_negative(&axis) {
            for v in axis.iter_mut() {
                *v = -*v;
            }
        }
        let column: Vec<f64> = (0..n)
            .map(|row| (0..dim).map(|col| centered[[row, col]] * axis[col]).sum())
            .collect();
        scores.push(column);
    }
    scores
}

fn is_trivial(lambda: f64, leading: f64) -> bool {
    lambda <= ABSOLUTE_VARIANCE_EPS || lambda <= leading.max(0.0) * RELATIVE_VARIANCE_EPS
}

fn dominant_is_negative(values: &[f64]) -> bool {
    values
        .iter()
        .copied()
        .max_by(|a, b| {
            a.abs()
                .partial_cmp(&b.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|v| v < 0.0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rabbithole_core::model::now_rfc3339;

    fn record(step: u64, vector: Vec<f32>) -> VectorRecord {
        VectorRecord {
            step,
            timestamp: now_rfc3339(),
            vector,
        }
    }

    #[test]
    fn empty_history_projects_to_empty() {
        let out = project(&[]).expect("project");
        assert!(out.is_empty());
    }

    #[test]
    fn single_record_sits_at_origin() {
        let out = project(&[record(1, vec![0.3, 0.4, 0.5, 0.6])]).expect("project");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].step, 1);
        assert_eq!(out[0].xyz, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn identical_vectors_all_land_at_origin() {
        let recs: Vec<_> = (1..=4).map(|s| record(s, vec![0.5, 0.5, 0.5])).collect();
        let out = project(&recs).expect("project");
        for p in &out {
            assert_eq!(p.xyz, [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn two_points_split_symmetrically_on_first_axis() {
        let recs = vec![
            record(1, vec![0.0, 0.0, 0.0]),
            record(2, vec![2.0, 0.0, 0.0]),
        ];
        let out = project(&recs).expect("project");

        // centered: ±1 along the only varying direction
        assert!((out[0].xyz[0] + 1.0).abs() < 1e-9 || (out[0].xyz[0] - 1.0).abs() < 1e-9);
        assert!((out[0].xyz[0] + out[1].xyz[0]).abs() < 1e-9, "symmetric about origin");
        for p in &out {
            assert!(p.xyz[1].abs() < 1e-9);
            assert!(p.xyz[2].abs() < 1e-9);
        }
    }

    #[test]
    fn sign_convention_puts_dominant_loading_positive() {
        let recs = vec![
            record(1, vec![0.0, 0.0]),
            record(2, vec![3.0, 0.1]),
        ];
        let out = project(&recs).expect("project");
        // the record further along the dominant direction gets the positive score
        assert!(out[1].xyz[0] > 0.0);
        assert!(out[0].xyz[0] < 0.0);
    }

    #[test]
    fn collinear_points_use_only_one_axis() {
        let recs: Vec<_> = (0..5)
            .map(|i| record(i as u64 + 1, vec![i as f32, 2.0 * i as f32, -i as f32]))
            .collect();
        let out = project(&recs).expect("project");
        for p in &out {
            assert!(p.xyz[1].abs() < 1e-8, "second axis should be zero-filled");
            assert!(p.xyz[2].abs() < 1e-8, "third axis should be zero-filled");
        }
        // spacing along PC1 mirrors the input spacing
        let d01 = out[1].xyz[0] - out[0].xyz[0];
        let d12 = out[2].xyz[0] - out[1].xyz[0];
        assert!((d01 - d12).abs() < 1e-8);
    }

    #[test]
    fn planar_points_leave_third_axis_empty() {
        // four points spanning exactly two directions in 4D
        let recs = vec![
            record(1, vec![0.0, 0.0, 0.0, 0.0]),
            record(2, vec![1.0, 0.0, 0.0, 0.0]),
            record(3, vec![0.0, 1.0, 0.0, 0.0]),
            record(4, vec![1.0, 1.0, 0.0, 0.0]),
        ];
        let out = project(&recs).expect("project");
        for p in &out {
            assert!(p.xyz[2].abs() < 1e-8);
        }
        // but the first two axes carry real variance
        assert!(out.iter().any(|p| p.xyz[0].abs() > 1e-6));
        assert!(out.iter().any(|p| p.xyz[1].abs() > 1e-6));
    }

    #[test]
    fn output_preserves_order_and_carries_metadata() {
        let recs = vec![
            record(1, vec![0.1, 0.9]),
            record(2, vec![0.4, 0.6]),
            record(3, vec![0.8, 0.2]),
        ];
        let out = project(&recs).expect("project");
        assert_eq!(out.len(), recs.len());
        for (src, dst) in recs.iter().zip(out.iter()) {
            assert_eq!(src.step, dst.step);
            assert_eq!(src.timestamp, dst.timestamp);
        }
    }

    #[test]
    fn history_longer_than_dimension_takes_covariance_path() {
        // n = 6 > dim = 2 → dim×dim scatter path
        let recs: Vec<_> = (0..6)
            .map(|i| {
                let t = i as f32 * 0.7;
                record(i as u64 + 1, vec![t.sin(), t.cos()])
            })
            .collect();
        let out = project(&recs).expect("project");
        assert_eq!(out.len(), 6);
        // 2D input can fill at most two axes
        for p in &out {
            assert!(p.xyz[2].abs() < 1e-9);
            assert!(p.xyz.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn gram_and_covariance_paths_agree() {
        // n == dim + 1 exercises both sides of the path split on the same data
        let data: Vec<Vec<f32>> = vec![
            vec![0.9, 0.1, 0.3],
            vec![0.2, 0.8, 0.4],
            vec![0.5, 0.5, 0.9],
            vec![0.1, 0.2, 0.1],
        ];
        let recs: Vec<_> = data
            .iter()
            .enumerate()
            .map(|(i, v)| record(i as u64 + 1, v.clone()))
            .collect();

        let n = recs.len();
        let dim = 3;
        let centered = centered_matrix(&recs, n, dim);
        let via_gram = gram_scores(&centered);
        let via_cov = covariance_scores(&centered);

        assert_eq!(via_gram.len(), via_cov.len());
        for (g, c) in via_gram.iter().zip(via_cov.iter()) {
            for (a, b) in g.iter().zip(c.iter()) {
                assert!((a - b).abs() < 1e-8, "gram {a} vs covariance {b}");
            }
        }
    }

    #[test]
    fn rejects_mixed_dimensions() {
        let recs = vec![record(1, vec![0.1, 0.2]), record(2, vec![0.1, 0.2, 0.3])];
        let err = project(&recs).unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::DimensionMismatch { step: 2, expected: 2, got: 3 }
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let recs = vec![record(1, vec![0.1, f32::NAN])];
        assert!(matches!(
            project(&recs).unwrap_err(),
            ProjectionError::NonFinite { step: 1 }
        ));
    }
}
