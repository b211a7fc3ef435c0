use crate::error::{check_length, Result, SptkError};
use crate::math::symmetric_matrix::SymmetricMatrix;
/// Solves `A x = b` for symmetric positive definite `A` through LDL^T.
pub fn solve_symmetric(matrix: &SymmetricMatrix, b: &[f64]) -> Result<Vec<f64>> {
    let n = matrix.dim();
    check_length(n, b.len())?;
    let (l, d) = matrix.cholesky_decomposition()?;
    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|k| l[[i, k]] * y[k]).sum();
        y[i] = b[i] - sum;
    }
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|k| l[[k, i]] * x[k]).sum();
        x[i] = y[i] / d[i] - sum;
    }
    Ok(x)
}
/// Solves `sum_i w_i x_i^k = q_k` for `k = 0..n` in O(n^2).
pub fn solve_vandermonde(x: &[f64], q: &[f64]) -> Result<Vec<f64>> {
    let n = x.len();
    check_length(n, q.len())?;
    match n {
        0 => return Err(SptkError::EmptyInput),
        1 => return Ok(vec![q[0]]),
        _ => {}
    }
    // coefficients of prod_i (z - x_i) below the leading term
    let mut c = vec![0.0; n];
    c[n - 1] = -x[0];
    for i in 1..n {
        let xx = -x[i];
        for j in (n - 1 - i)..(n - 1) {
            c[j] += xx * c[j + 1];
        }
        c[n - 1] += xx;
    }
    x.iter()
        .map(|&xx| {
            let mut b = 1.0;
            let mut s = q[n - 1];
            let mut t = 1.0;
            for k in (1..n).rev() {
                b = c[k] + xx * b;
                s += q[k - 1] * b;
                t = xx * t + b;
            }
            if t == 0.0 {
                return Err(SptkError::numeric("Vandermonde system is singular"));
            }
            Ok(s / t)
        })
        .collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_solve_symmetric() -> Result<()> {
        let m = SymmetricMatrix::from_lower_triangle(3, vec![4.0, 2.0, 5.0, -2.0, 1.0, 6.0])?;
        let expected = [1.0, -2.0, 0.5];
        let a = m.to_array();
        let b: Vec<f64> = (0..3).map(|i| (0..3).map(|j| a[[i, j]] * expected[j]).sum()).collect();
        let x = solve_symmetric(&m, &b)?;
        for (v, e) in x.iter().zip(expected.iter()) {
            assert!((v - e).abs() < 1e-12, "got {} expected {}", v, e);
        }
        assert!(solve_symmetric(&m, &[1.0]).is_err());
        Ok(())
    }
    #[test]
    fn test_solve_vandermonde() -> Result<()> {
        let x: [f64; 3] = [0.5, -0.25, 0.9];
        let w = [0.2, 0.3, 0.5];
        let q: Vec<f64> = (0..3)
            .map(|k| x.iter().zip(w.iter()).map(|(xi, wi)| wi * xi.powi(k)).sum())
            .collect();
        let solved = solve_vandermonde(&x, &q)?;
        for (v, e) in solved.iter().zip(w.iter()) {
            assert!((v - e).abs() < 1e-12, "got {} expected {}", v, e);
        }
        assert_eq!(solve_vandermonde(&[3.0], &[2.0])?, vec![2.0]);
        assert!(solve_vandermonde(&[0.5, 0.5], &[1.0, 1.0]).is_err());
        Ok(())
    }
}
