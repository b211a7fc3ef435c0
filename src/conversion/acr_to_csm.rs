use crate::error::{check_length, Result, SptkError};
use crate::math::durand_kerner::DurandKerner;
use crate::math::solvers::{solve_symmetric, solve_vandermonde};
use crate::math::symmetric_matrix::SymmetricMatrix;
#[derive(Debug, Default)]
pub struct AcrToCsmBuffer {
    u: Vec<f64>,
    matrix: SymmetricMatrix,
}
/// Autocorrelation `r(0..=M)` to composite sinusoidal modeling parameters
/// `[w(1), ..., w(K), m(1), ..., m(K)]` with `K = M / 2` sinusoids.
#[derive(Debug, Clone)]
pub struct AcrToCsm {
    num_order: usize,
    num_sine_wave: usize,
    root_finder: DurandKerner,
    is_valid: bool,
}
/// `u(l) = 2^-l sum_k C(l, k) r(|l - 2k|)`, the autocorrelation expressed in
/// powers of `cos w`.
fn binomial_shift(r: &[f64], len: usize, u: &mut Vec<f64>) {
    u.clear();
    for l in 0..len {
        let mut binomial = 1.0;
        let mut sum = 0.0;
        for k in 0..=l {
            sum += binomial * r[l.abs_diff(2 * k)];
            binomial = binomial * (l - k) as f64 / (k + 1) as f64;
        }
        u.push(sum / 2f64.powi(l as i32));
    }
}
impl AcrToCsm {
    pub fn new(num_order: usize, num_iteration: usize, convergence_threshold: f64) -> Self {
        let num_sine_wave = num_order.div_ceil(2);
        let root_finder = DurandKerner::new(num_sine_wave, num_iteration, convergence_threshold);
        let is_valid = num_order >= 2 && num_order % 2 == 0 && root_finder.is_valid();
        Self { num_order, num_sine_wave, root_finder, is_valid }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    pub fn num_sine_wave(&self) -> usize {
        self.num_sine_wave
    }
    pub fn run(&self, autocorrelation: &[f64], csm: &mut Vec<f64>, buffer: &mut AcrToCsmBuffer) -> Result<()> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("autocorrelation to csm"));
        }
        check_length(self.num_order + 1, autocorrelation.len())?;
        let k = self.num_sine_wave;
        binomial_shift(autocorrelation, 2 * k, &mut buffer.u);
        let u = &buffer.u;
        // U = -[u(i + j)] is negative definite, so factor -U instead
        buffer.matrix.resize(k);
        for i in 0..k {
            for j in 0..=i {
                buffer.matrix[(i, j)] = u[i + j];
            }
        }
        let rhs: Vec<f64> = u[k..2 * k].iter().map(|x| -x).collect();
        let p = solve_symmetric(&buffer.matrix, &rhs)?;
        let coefficients: Vec<f64> = p.into_iter().rev().collect();
        let roots = self.root_finder.run(&coefficients)?;
        let mut x: Vec<f64> = roots.iter().map(|c| c.re).collect();
        if let Some(bad) = x.iter().find(|v| v.abs() > 1.0) {
            return Err(SptkError::numeric(format!("root {} lies outside [-1, 1]", bad)));
        }
        x.sort_by(|a, b| b.total_cmp(a));
        let intensities = solve_vandermonde(&x, &u[..k])?;
        csm.clear();
        csm.extend(x.iter().map(|v| v.acos()));
        csm.extend(intensities);
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    #[test]
    fn test_binomial_shift() {
        let mut u = Vec::new();
        binomial_shift(&[1.0, 0.5, 0.25, 0.125, 0.0625], 4, &mut u);
        let expected = [1.0, 0.5, 0.625, 0.40625];
        for (a, b) in u.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-15, "{} vs {}", a, b);
        }
    }
    #[test]
    fn test_geometric_autocorrelation() -> Result<()> {
        let r = [1.0, 0.5, 0.25, 0.125, 0.0625];
        let csm_kernel = AcrToCsm::new(4, 1000, 1e-12);
        let mut csm = Vec::new();
        csm_kernel.run(&r, &mut csm, &mut AcrToCsmBuffer::default())?;
        assert_eq!(csm.len(), 4);
        assert!(0.0 < csm[0] && csm[0] < csm[1] && csm[1] < PI, "csm = {:?}", csm);
        assert!(csm[2] >= 0.0 && csm[3] >= 0.0);
        assert!((csm[2] + csm[3] - r[0]).abs() < 1e-9, "intensities {:?}", &csm[2..]);
        assert!((csm[2] - 0.7610).abs() < 1e-3);
        Ok(())
    }
    #[test]
    fn test_recovers_sinusoids() -> Result<()> {
        // r(l) = sum_k m_k cos(l w_k)
        let w = [0.4, 1.9];
        let m = [0.7, 0.3];
        let r: Vec<f64> = (0..5)
            .map(|l| w.iter().zip(m.iter()).map(|(wk, mk)| mk * (l as f64 * wk).cos()).sum())
            .collect();
        let mut csm = Vec::new();
        AcrToCsm::new(4, 1000, 1e-12).run(&r, &mut csm, &mut AcrToCsmBuffer::default())?;
        for (a, b) in csm.iter().zip(w.iter().chain(m.iter())) {
            assert!((a - b).abs() < 1e-8, "{} vs {}", a, b);
        }
        Ok(())
    }
    #[test]
    fn test_rejections() {
        assert!(!AcrToCsm::new(3, 1000, 1e-12).is_valid());
        assert!(!AcrToCsm::new(0, 1000, 1e-12).is_valid());
        let kernel = AcrToCsm::new(4, 1000, 1e-12);
        let mut csm = vec![1.0];
        assert!(kernel.run(&[1.0, 0.5, 0.25], &mut csm, &mut AcrToCsmBuffer::default()).is_err());
        // not a valid autocorrelation
        assert!(kernel.run(&[1.0, 2.0, 3.0, 4.0, 5.0], &mut csm, &mut AcrToCsmBuffer::default()).is_err());
        assert_eq!(csm, vec![1.0]);
    }
}
