use crate::error::{check_length, Result, SptkError};
#[derive(Debug, Default)]
pub struct LpcToParcorBuffer {
    a: Vec<f64>,
    k: Vec<f64>,
}
/// Backward Levinson recursion from `[K, a(1..M)]` to `[K, k(1..M)]`.
///
/// The LPC are scaled by `gamma` first, which lets generalized cepstral
/// coefficients with `gamma = -1/c` be converted as well.
#[derive(Debug, Clone)]
pub struct LpcToParcor {
    num_order: usize,
    gamma: f64,
    is_valid: bool,
}
impl LpcToParcor {
    pub fn new(num_order: usize, gamma: f64) -> Self {
        let is_valid = gamma.is_finite() && (-1.0..=1.0).contains(&gamma);
        Self { num_order, gamma, is_valid }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    /// Returns `Ok(is_stable)`, false when some `|k(i)| >= 1`.
    pub fn run(&self, lpc: &[f64], parcor: &mut Vec<f64>, buffer: &mut LpcToParcorBuffer) -> Result<bool> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("lpc to parcor"));
        }
        let m = self.num_order;
        check_length(m + 1, lpc.len())?;
        if m == 0 {
            *parcor = vec![lpc[0]];
            return Ok(true);
        }
        buffer.a.clear();
        if self.gamma == 1.0 {
            buffer.a.extend_from_slice(lpc);
        } else {
            buffer.a.push(lpc[0]);
            buffer.a.extend(lpc[1..].iter().map(|x| x * self.gamma));
        }
        buffer.k.clear();
        buffer.k.resize(m + 1, 0.0);
        buffer.k[0] = lpc[0];
        let (a, k) = (&mut buffer.a, &mut buffer.k);
        let mut is_stable = true;
        for i in (1..=m).rev() {
            k[1..=i].copy_from_slice(&a[1..=i]);
            let denominator = 1.0 - k[i] * k[i];
            if denominator == 0.0 {
                return Err(SptkError::numeric(format!("reflection coefficient k({}) has unit magnitude", i)));
            }
            if k[i].abs() >= 1.0 {
                is_stable = false;
            }
            for j in 1..i {
                a[j] = (k[j] - k[i] * k[i - j]) / denominator;
            }
        }
        parcor.clear();
        parcor.extend_from_slice(k);
        Ok(is_stable)
    }
    pub fn run_in_place(&self, input_and_output: &mut Vec<f64>, buffer: &mut LpcToParcorBuffer) -> Result<bool> {
        let input = input_and_output.clone();
        self.run(&input, input_and_output, buffer)
    }
}
