use crate::error::{check_length, Result, SptkError};
fn is_valid_alpha(alpha: f64) -> bool {
    alpha.is_finite() && alpha.abs() < 1.0
}
/// Mel-cepstrum `c~(m)` to MLSA filter coefficients `b(m)`:
/// `b(M) = c~(M)`, `b(m) = c~(m) - alpha b(m+1)`.
#[derive(Debug, Clone)]
pub struct MelCepstrumToMlsa {
    num_order: usize,
    alpha: f64,
    is_valid: bool,
}
impl MelCepstrumToMlsa {
    pub fn new(num_order: usize, alpha: f64) -> Self {
        Self { num_order, alpha, is_valid: is_valid_alpha(alpha) }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    pub fn run(&self, mel_cepstrum: &[f64], mlsa: &mut Vec<f64>) -> Result<()> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("mel-cepstrum to mlsa"));
        }
        check_length(self.num_order + 1, mel_cepstrum.len())?;
        let m = self.num_order;
        let mut b = mel_cepstrum.to_vec();
        if self.alpha != 0.0 {
            for i in (0..m).rev() {
                b[i] = mel_cepstrum[i] - self.alpha * b[i + 1];
            }
        }
        *mlsa = b;
        Ok(())
    }
    pub fn run_in_place(&self, input_and_output: &mut Vec<f64>) -> Result<()> {
        let input = input_and_output.clone();
        self.run(&input, input_and_output)
    }
}
/// MLSA filter coefficients `b(m)` to mel-cepstrum:
/// `c~(M) = b(M)`, `c~(m) = b(m) + alpha b(m+1)`.
#[derive(Debug, Clone)]
pub struct MlsaToMelCepstrum {
    num_order: usize,
    alpha: f64,
    is_valid: bool,
}
impl MlsaToMelCepstrum {
    pub fn new(num_order: usize, alpha: f64) -> Self {
        Self { num_order, alpha, is_valid: is_valid_alpha(alpha) }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    pub fn run(&self, mlsa: &[f64], mel_cepstrum: &mut Vec<f64>) -> Result<()> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("mlsa to mel-cepstrum"));
        }
        check_length(self.num_order + 1, mlsa.len())?;
        let m = self.num_order;
        let mut c = mlsa.to_vec();
        if self.alpha != 0.0 {
            for i in 0..m {
                c[i] = mlsa[i] + self.alpha * mlsa[i + 1];
            }
        }
        *mel_cepstrum = c;
        Ok(())
    }
    pub fn run_in_place(&self, input_and_output: &mut Vec<f64>) -> Result<()> {
        let input = input_and_output.clone();
        self.run(&input, input_and_output)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_known_values() -> Result<()> {
        let mut b = Vec::new();
        MelCepstrumToMlsa::new(2, 0.5).run(&[1.0, 1.0, 1.0], &mut b)?;
        assert_eq!(b, vec![0.75, 0.5, 1.0]);
        let mut c = Vec::new();
        MlsaToMelCepstrum::new(2, 0.5).run(&b, &mut c)?;
        assert_eq!(c, vec![1.0, 1.0, 1.0]);
        Ok(())
    }
    #[test]
    fn test_round_trip() -> Result<()> {
        let b = vec![0.1, 0.2, 0.3];
        let mut c = Vec::new();
        MlsaToMelCepstrum::new(2, 0.35).run(&b, &mut c)?;
        let mut restored = Vec::new();
        MelCepstrumToMlsa::new(2, 0.35).run(&c, &mut restored)?;
        for (x, y) in b.iter().zip(restored.iter()) {
            assert!((x - y).abs() < 1e-15, "{} vs {}", x, y);
        }
        Ok(())
    }
    #[test]
    fn test_identity_and_validity() -> Result<()> {
        let mut v = vec![0.1, 0.2];
        MelCepstrumToMlsa::new(1, 0.0).run_in_place(&mut v)?;
        assert_eq!(v, vec![0.1, 0.2]);
        assert!(!MelCepstrumToMlsa::new(1, 1.0).is_valid());
        assert!(MlsaToMelCepstrum::new(1, -1.0).run_in_place(&mut v).is_err());
        assert!(MlsaToMelCepstrum::new(2, 0.3).run_in_place(&mut v).is_err());
        Ok(())
    }
}
