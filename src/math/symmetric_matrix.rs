use crate::error::{Result, SptkError};
use ndarray::Array2;
use std::ops::{Index, IndexMut};
/// Real symmetric matrix holding only its lower triangle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymmetricMatrix {
    dim: usize,
    data: Vec<f64>,
}
#[inline(always)]
fn offset(i: usize, j: usize) -> usize {
    if i >= j { i * (i + 1) / 2 + j } else { j * (j + 1) / 2 + i }
}
impl SymmetricMatrix {
    pub fn new(dim: usize) -> Self {
        Self { dim, data: vec![0.0; dim * (dim + 1) / 2] }
    }
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::new(dim);
        (0..dim).for_each(|i| m[(i, i)] = 1.0);
        m
    }
    pub fn from_lower_triangle(dim: usize, values: Vec<f64>) -> Result<Self> {
        crate::error::check_length(dim * (dim + 1) / 2, values.len())?;
        Ok(Self { dim, data: values })
    }
    /// Builds from the lower triangle of a square array.
    pub fn from_array(array: &Array2<f64>) -> Result<Self> {
        let (rows, cols) = array.dim();
        crate::error::check_length(rows, cols)?;
        let mut m = Self::new(rows);
        for i in 0..rows {
            for j in 0..=i {
                m[(i, j)] = array[[i, j]];
            }
        }
        Ok(m)
    }
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.dim, self.dim), |(i, j)| self[(i, j)])
    }
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[offset(i, j)]
    }
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[offset(i, j)] = value;
    }
    pub fn lower_triangle(&self) -> &[f64] {
        &self.data
    }
    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }
    /// Resizes to `dim` and zeroes every element.
    pub fn resize(&mut self, dim: usize) {
        self.dim = dim;
        self.data.clear();
        self.data.resize(dim * (dim + 1) / 2, 0.0);
    }
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.dim).map(|i| self[(i, i)]).collect()
    }
    /// LDL^T factorisation: returns the unit lower triangular `L` and the diagonal `D`.
    pub fn cholesky_decomposition(&self) -> Result<(Array2<f64>, Vec<f64>)> {
        let n = self.dim;
        if n == 0 {
            return Err(SptkError::EmptyInput);
        }
        let mut l = Array2::<f64>::eye(n);
        let mut d = vec![0.0; n];
        for i in 0..n {
            for j in 0..i {
                let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]] * d[k]).sum();
                l[[i, j]] = (self[(i, j)] - sum) / d[j];
            }
            let sum: f64 = (0..i).map(|k| l[[i, k]] * l[[i, k]] * d[k]).sum();
            d[i] = self[(i, i)] - sum;
            if !(d[i] > 0.0) {
                return Err(SptkError::numeric(format!(
                    "matrix is not positive definite (pivot {} = {})",
                    i, d[i]
                )));
            }
        }
        Ok((l, d))
    }
    pub fn log_determinant(&self) -> Result<f64> {
        let (_, d) = self.cholesky_decomposition()?;
        Ok(d.iter().map(|x| x.ln()).sum())
    }
    pub fn invert(&self) -> Result<SymmetricMatrix> {
        let (l, d) = self.cholesky_decomposition()?;
        invert_from_factors(&l, &d)
    }
}
/// Computes `L^-T D^-1 L^-1` from an LDL^T factorisation.
pub fn invert_from_factors(l: &Array2<f64>, d: &[f64]) -> Result<SymmetricMatrix> {
    let n = d.len();
    let mut inv_l = Array2::<f64>::eye(n);
    for i in 1..n {
        for j in 0..i {
            let sum: f64 = (j..i).map(|k| l[[i, k]] * inv_l[[k, j]]).sum();
            inv_l[[i, j]] = -sum;
        }
    }
    let mut out = SymmetricMatrix::new(n);
    for i in 0..n {
        for j in 0..=i {
            let value: f64 = (i..n).map(|k| inv_l[[k, i]] * inv_l[[k, j]] / d[k]).sum();
            if !value.is_finite() {
                return Err(SptkError::numeric("matrix inversion produced a non-finite value"));
            }
            out[(i, j)] = value;
        }
    }
    Ok(out)
}
impl Index<(usize, usize)> for SymmetricMatrix {
    type Output = f64;
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[offset(i, j)]
    }
}
impl IndexMut<(usize, usize)> for SymmetricMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[offset(i, j)]
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn sample() -> SymmetricMatrix {
        let mut m = SymmetricMatrix::new(3);
        m[(0, 0)] = 4.0;
        m[(1, 0)] = 2.0;
        m[(1, 1)] = 5.0;
        m[(2, 0)] = -2.0;
        m[(2, 1)] = 1.0;
        m[(2, 2)] = 6.0;
        m
    }
    #[test]
    fn test_symmetric_access() {
        let mut m = sample();
        assert_eq!(m.get(0, 2), m.get(2, 0));
        m.set(0, 1, 7.0);
        assert_eq!(m[(1, 0)], 7.0);
        assert_eq!(m.lower_triangle(), &[4.0, 7.0, 5.0, -2.0, 1.0, 6.0]);
        let a = m.to_array();
        assert_eq!(a, a.t());
    }
    #[test]
    fn test_cholesky_reconstructs() -> Result<()> {
        let m = sample();
        let (l, d) = m.cholesky_decomposition()?;
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|k| l[[i, k]] * d[k] * l[[j, k]]).sum();
                assert!((v - m[(i, j)]).abs() < 1e-12, "LDL^T mismatch at ({}, {})", i, j);
            }
        }
        Ok(())
    }
    #[test]
    fn test_inverse() -> Result<()> {
        let m = sample();
        let inv = m.invert()?;
        let product = m.to_array().dot(&inv.to_array());
        let eye = Array2::<f64>::eye(3);
        assert!(product.iter().zip(eye.iter()).all(|(a, b)| (a - b).abs() < 1e-12));
        let det: f64 = 4.0 * (5.0 * 6.0 - 1.0) - 2.0 * (2.0 * 6.0 + 2.0) + -2.0 * (2.0 + 10.0);
        assert!((m.log_determinant()? - det.ln()).abs() < 1e-12);
        Ok(())
    }
    #[test]
    fn test_not_positive_definite() {
        let mut m = SymmetricMatrix::identity(2);
        m[(1, 0)] = 2.0;
        assert!(matches!(m.cholesky_decomposition(), Err(SptkError::NumericError(_))));
        assert!(SymmetricMatrix::from_lower_triangle(2, vec![1.0, 2.0]).is_err());
    }
}
