//! Symmetric eigendecomposition via cyclic Jacobi rotations.
//!
//! The matrices here are tiny (min(n, dim) square, and only the top three
//! eigenpairs matter), so a dependency-free Jacobi sweep beats pulling in a
//! LAPACK binding. Input must be symmetric; the routine reads and writes
//! both triangles.

use ndarray::Array2;

const MAX_SWEEPS: usize = 64;
const OFF_DIAGONAL_TOL: f64 = 1e-12;

/// Eigendecomposition of a symmetric matrix.
///
/// Returns `(eigenvalues, eigenvectors)` sorted by descending eigenvalue,
/// with eigenvectors as the columns of the returned matrix. Convergence is
/// declared when the off-diagonal Frobenius norm falls below
/// `OFF_DIAGONAL_TOL` relative to the matrix norm, or after `MAX_SWEEPS`
/// full sweeps, whichever comes first.
pub fn eigh(mut a: Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let m = a.nrows();
    debug_assert_eq!(m, a.ncols(), "matrix must be square");
    let mut v = Array2::<f64>::eye(m);

    if m > 1 {
        let scale = frobenius(&a).max(f64::MIN_POSITIVE);
        for _ in 0..MAX_SWEEPS {
            if off_diagonal_norm(&a) <= OFF_DIAGONAL_TOL * scale {
                break;
            }
            for p in 0..m - 1 {
                for q in p + 1..m {
                    rotate(&mut a, &mut v, p, q);
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&i, &j| {
        a[[j, j]]
            .partial_cmp(&a[[i, i]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let eigenvalues: Vec<f64> = order.iter().map(|&i| a[[i, i]]).collect();
    let mut eigenvectors = Array2::<f64>::zeros((m, m));
    for (dst, &src) in order.iter().enumerate() {
        for row in 0..m {
            eigenvectors[[row, dst]] = v[[row, src]];
        }
    }
    (eigenvalues, eigenvectors)
}

/// One Jacobi rotation zeroing `a[[p, q]]`.
fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize) {
    let apq = a[[p, q]];
    if apq.abs() < f64::MIN_POSITIVE {
        return;
    }

    let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    let app = a[[p, p]];
    let aqq = a[[q, q]];
    a[[p, p]] = app - t * apq;
    a[[q, q]] = aqq + t * apq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    let m = a.nrows();
    for i in 0..m {
        if i == p || i == q {
            continue;
        }
        let aip = a[[i, p]];
        let aiq = a[[i, q]];
        a[[i, p]] = c * aip - s * aiq;
        a[[p, i]] = a[[i, p]];
        a[[i, q]] = c * aiq + s * aip;
        a[[q, i]] = a[[i, q]];
    }

    for i in 0..m {
        let vip = v[[i, p]];
        let viq = v[[i, q]];
        v[[i, p]] = c * vip - s * viq;
        v[[i, q]] = c * viq + s * vip;
    }
}

fn frobenius(a: &Array2<f64>) -> f64 {
    a.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    let m = a.nrows();
    let mut sum = 0.0;
    for i in 0..m {
        for j in 0..m {
            if i != j {
                sum += a[[i, j]] * a[[i, j]];
            }
        }
    }
    sum.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "expected {b}, got {a}");
    }

    #[test]
    fn diagonal_matrix_is_its_own_decomposition() {
        let (vals, vecs) = eigh(array![[3.0, 0.0], [0.0, 1.0]]);
        assert_close(vals[0], 3.0, 1e-12);
        assert_close(vals[1], 1.0, 1e-12);
        assert_close(vecs[[0, 0]].abs(), 1.0, 1e-12);
        assert_close(vecs[[1, 1]].abs(), 1.0, 1e-12);
    }

    #[test]
    fn known_2x2_eigenvalues() {
        // [[2, 1], [1, 2]] has eigenvalues 3 and 1
        let (vals, vecs) = eigh(array![[2.0, 1.0], [1.0, 2.0]]);
        assert_close(vals[0], 3.0, 1e-10);
        assert_close(vals[1], 1.0, 1e-10);
        // leading eigenvector is (1, 1)/√2 up to sign
        let ratio = vecs[[0, 0]] / vecs[[1, 0]];
        assert_close(ratio, 1.0, 1e-8);
    }

    #[test]
    fn eigenvectors_are_orthonormal() {
        let a = array![
            [4.0, 1.0, 0.5],
            [1.0, 3.0, -0.25],
            [0.5, -0.25, 2.0]
        ];
        let (_, vecs) = eigh(a);
        for i in 0..3 {
            for j in 0..3 {
                let dot: f64 = (0..3).map(|r| vecs[[r, i]] * vecs[[r, j]]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_close(dot, expected, 1e-10);
            }
        }
    }

    #[test]
    fn reconstruction_matches_original() {
        let a = array![
            [5.0, 2.0, 1.0],
            [2.0, 4.0, 0.5],
            [1.0, 0.5, 3.0]
        ];
        let (vals, vecs) = eigh(a.clone());
        // A ≈ V diag(λ) Vᵀ
        for i in 0..3 {
            for j in 0..3 {
                let rebuilt: f64 = (0..3).map(|k| vecs[[i, k]] * vals[k] * vecs[[j, k]]).sum();
                assert_close(rebuilt, a[[i, j]], 1e-9);
            }
        }
    }

    #[test]
    fn one_by_one_matrix() {
        let (vals, vecs) = eigh(array![[7.5]]);
        assert_close(vals[0], 7.5, 1e-15);
        assert_close(vecs[[0, 0]], 1.0, 1e-15);
    }

    #[test]
    fn zero_matrix_yields_zero_eigenvalues() {
        let (vals, _) = eigh(Array2::<f64>::zeros((4, 4)));
        for v in vals {
            assert_close(v, 0.0, 1e-15);
        }
    }
}
