use crate::error::{check_length, Result, SptkError};
use num_complex::Complex64;
use std::f64::consts::PI;
/// Simultaneous root finder for the monic polynomial
/// `x^K + a[0] x^(K-1) + ... + a[K-1]`.
#[derive(Debug, Clone)]
pub struct DurandKerner {
    num_order: usize,
    num_iteration: usize,
    convergence_threshold: f64,
}
impl DurandKerner {
    pub fn new(num_order: usize, num_iteration: usize, convergence_threshold: f64) -> Self {
        Self { num_order, num_iteration, convergence_threshold }
    }
    pub fn is_valid(&self) -> bool {
        self.num_order >= 1 && self.num_iteration >= 1 && self.convergence_threshold >= 0.0
    }
    fn initial_roots(&self, a: &[f64]) -> Vec<Complex64> {
        let k = self.num_order as f64;
        let center = -a[0] / k;
        let radius = a
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &v)| 2.0 * v.abs().powf(1.0 / (i + 1) as f64))
            .fold(0.0, f64::max);
        let radius = if radius > 0.0 { radius } else { 1.0 };
        (0..self.num_order)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / k + 0.5 * PI / k;
                Complex64::new(center, 0.0) + Complex64::from_polar(radius, theta)
            })
            .collect()
    }
    pub fn run(&self, coefficients: &[f64]) -> Result<Vec<Complex64>> {
        if !self.is_valid() {
            return Err(SptkError::NotInitialized("durand-kerner"));
        }
        check_length(self.num_order, coefficients.len())?;
        if coefficients.iter().any(|x| !x.is_finite()) {
            return Err(SptkError::numeric("polynomial has non-finite coefficients"));
        }
        let mut roots = self.initial_roots(coefficients);
        for _ in 0..self.num_iteration {
            let mut converged = true;
            for j in 0..roots.len() {
                let x = roots[j];
                let numerator = coefficients
                    .iter()
                    .fold(Complex64::new(1.0, 0.0), |acc, &a| acc * x + a);
                let denominator = roots
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != j)
                    .fold(Complex64::new(1.0, 0.0), |acc, (_, &r)| acc * (x - r));
                if denominator.norm_sqr() == 0.0 {
                    converged = false;
                    continue;
                }
                let delta = numerator / denominator;
                roots[j] = x - delta;
                if delta.norm() > self.convergence_threshold {
                    converged = false;
                }
            }
            if converged {
                return Ok(roots);
            }
        }
        Err(SptkError::numeric("Durand-Kerner method did not converge"))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn sorted_real_parts(roots: &[Complex64]) -> Vec<f64> {
        let mut re: Vec<f64> = roots.iter().map(|c| c.re).collect();
        re.sort_by(|a, b| a.total_cmp(b));
        re
    }
    #[test]
    fn test_real_roots() -> Result<()> {
        // (x - 1)(x - 2)(x + 3) = x^3 - 7x + 6
        let dk = DurandKerner::new(3, 1000, 1e-12);
        let roots = dk.run(&[0.0, -7.0, 6.0])?;
        let re = sorted_real_parts(&roots);
        for (v, e) in re.iter().zip([-3.0, 1.0, 2.0].iter()) {
            assert!((v - e).abs() < 1e-10, "got {} expected {}", v, e);
        }
        assert!(roots.iter().all(|c| c.im.abs() < 1e-10));
        Ok(())
    }
    #[test]
    fn test_complex_roots() -> Result<()> {
        // x^2 + 1
        let dk = DurandKerner::new(2, 1000, 1e-12);
        let roots = dk.run(&[0.0, 1.0])?;
        let mut im: Vec<f64> = roots.iter().map(|c| c.im).collect();
        im.sort_by(|a, b| a.total_cmp(b));
        assert!((im[0] + 1.0).abs() < 1e-10 && (im[1] - 1.0).abs() < 1e-10);
        Ok(())
    }
    #[test]
    fn test_failures() {
        let dk = DurandKerner::new(3, 1, 0.0);
        assert!(matches!(dk.run(&[0.0, -7.0, 6.0]), Err(SptkError::NumericError(_))));
        assert!(dk.run(&[0.0, 1.0]).is_err());
        assert!(!DurandKerner::new(0, 10, 1e-6).is_valid());
    }
}
