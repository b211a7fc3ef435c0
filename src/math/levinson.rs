use crate::error::{check_length, Result, SptkError};
#[derive(Debug, Default)]
pub struct LevinsonBuffer {
    previous: Vec<f64>,
}
/// Levinson-Durbin recursion from `r(0..=M)` to `[K, a(1), ..., a(M)]`
/// where `K` is the square root of the prediction error.
#[derive(Debug, Clone)]
pub struct LevinsonDurbin {
    num_order: usize,
}
impl LevinsonDurbin {
    pub fn new(num_order: usize) -> Self {
        Self { num_order }
    }
    /// Returns whether every reflection coefficient has magnitude below one.
    pub fn run(&self, autocorrelation: &[f64], coefficients: &mut Vec<f64>, buffer: &mut LevinsonBuffer) -> Result<bool> {
        let m = self.num_order;
        check_length(m + 1, autocorrelation.len())?;
        let r = autocorrelation;
        if !(r[0] > 0.0) {
            return Err(SptkError::numeric("zero-th autocorrelation must be positive"));
        }
        let mut a = vec![0.0; m + 1];
        buffer.previous.clear();
        buffer.previous.resize(m + 1, 0.0);
        let mut error = r[0];
        let mut is_stable = true;
        for i in 1..=m {
            let acc: f64 = (1..i).map(|j| buffer.previous[j] * r[i - j]).sum();
            let k = -(r[i] + acc) / error;
            if k.abs() >= 1.0 {
                is_stable = false;
            }
            a[i] = k;
            for j in 1..i {
                a[j] = buffer.previous[j] + k * buffer.previous[i - j];
            }
            error *= 1.0 - k * k;
            if error < 0.0 || !error.is_finite() {
                return Err(SptkError::numeric("prediction error became negative"));
            }
            buffer.previous[..=i].copy_from_slice(&a[..=i]);
        }
        a[0] = error.sqrt();
        *coefficients = a;
        Ok(is_stable)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_first_order() -> Result<()> {
        let mut out = Vec::new();
        let mut buffer = LevinsonBuffer::default();
        let stable = LevinsonDurbin::new(1).run(&[1.0, 0.5], &mut out, &mut buffer)?;
        assert!(stable);
        assert!((out[1] + 0.5).abs() < 1e-15);
        assert!((out[0] - 0.75f64.sqrt()).abs() < 1e-15);
        Ok(())
    }
    #[test]
    fn test_ar2_recovery() -> Result<()> {
        // x(n) = 1.5 x(n-1) - 0.7 x(n-2) + e(n) has a(1) = -1.5, a(2) = 0.7
        let (a1, a2) = (-1.5, 0.7);
        let rho1 = -a1 / (1.0 + a2);
        let rho2 = -a1 * rho1 - a2;
        let mut out = Vec::new();
        let mut buffer = LevinsonBuffer::default();
        LevinsonDurbin::new(2).run(&[1.0, rho1, rho2], &mut out, &mut buffer)?;
        assert!((out[1] - a1).abs() < 1e-12, "a1 = {}", out[1]);
        assert!((out[2] - a2).abs() < 1e-12, "a2 = {}", out[2]);
        Ok(())
    }
    #[test]
    fn test_invalid_input() {
        let mut out = vec![9.0];
        let mut buffer = LevinsonBuffer::default();
        assert!(LevinsonDurbin::new(1).run(&[0.0, 0.0], &mut out, &mut buffer).is_err());
        assert!(LevinsonDurbin::new(2).run(&[1.0, 0.0], &mut out, &mut buffer).is_err());
        assert_eq!(out, vec![9.0]);
    }
}
