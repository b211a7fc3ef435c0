//! Stability check of the MLSA digital filter.
//!
//! The basic filter's log spectrum `F(w)` must stay below a threshold that
//! depends on the Pade approximation order, otherwise the exponential
//! approximation diverges.
use crate::error::{check_length, Result, SptkError};
use crate::math::fft::{RealFft, RealFftBuffer};
use num_complex::Complex64;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationType {
    Clipping,
    Scaling,
}
impl TryFrom<u8> for ModificationType {
    type Error = SptkError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ModificationType::Clipping),
            1 => Ok(ModificationType::Scaling),
            _ => Err(SptkError::invalid(format!("unknown modification type {}", value))),
        }
    }
}
/// What to do when a frame fails a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningType {
    Ignore,
    Warn,
    Exit,
}
impl TryFrom<u8> for WarningType {
    type Error = SptkError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WarningType::Ignore),
            1 => Ok(WarningType::Warn),
            2 => Ok(WarningType::Exit),
            _ => Err(SptkError::invalid(format!("unknown warning type {}", value))),
        }
    }
}
/// Threshold for Pade order 4..=7. `keep_maximum_error` keeps the log
/// approximation error bounded, otherwise only stability is preserved.
pub fn default_threshold(pade_order: usize, keep_maximum_error: bool) -> Result<f64> {
    let (strict, lax) = match pade_order {
        4 => (4.5, 6.20),
        5 => (6.0, 7.65),
        6 => (7.4, 9.13),
        7 => (8.9, 10.60),
        _ => return Err(SptkError::invalid(format!("pade order {} is not in [4, 7]", pade_order))),
    };
    Ok(if keep_maximum_error { strict } else { lax })
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityReport {
    pub is_stable: bool,
    pub maximum_amplitude: f64,
}
#[derive(Debug, Default)]
pub struct MlsaStabilityCheckBuffer {
    cepstrum: Vec<f64>,
    spectrum: Vec<Complex64>,
    amplitude: Vec<f64>,
    restored: Vec<f64>,
    fft: RealFftBuffer,
}
#[derive(Debug, Clone)]
pub struct MlsaStabilityCheck {
    num_order: usize,
    alpha: f64,
    threshold: f64,
    fast_mode: bool,
    modification_type: ModificationType,
    fft: RealFft,
    is_valid: bool,
}
impl MlsaStabilityCheck {
    pub fn new(
        num_order: usize,
        alpha: f64,
        threshold: f64,
        fast_mode: bool,
        fft_length: usize,
        modification_type: ModificationType,
    ) -> Self {
        let fft = RealFft::new(fft_length);
        let is_valid = alpha.abs() < 1.0
            && threshold > 0.0
            && (fast_mode || (fft.is_valid() && num_order < fft_length));
        Self { num_order, alpha, threshold, fast_mode, modification_type, fft, is_valid }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
    /// Checks `mel_cepstrum` and, when `modified` is given, writes a
    /// coefficient vector whose basic filter satisfies the threshold.
    pub fn run(
        &self,
        mel_cepstrum: &[f64],
        modified: Option<&mut Vec<f64>>,
        buffer: &mut MlsaStabilityCheckBuffer,
    ) -> Result<StabilityReport> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("mlsa stability check"));
        }
        check_length(self.num_order + 1, mel_cepstrum.len())?;
        if self.num_order == 0 {
            if let Some(out) = modified {
                *out = mel_cepstrum.to_vec();
            }
            return Ok(StabilityReport { is_stable: true, maximum_amplitude: 0.0 });
        }
        let gain: f64 = mel_cepstrum
            .iter()
            .scan(1.0, |power, &c| {
                let term = c * *power;
                *power *= -self.alpha;
                Some(term)
            })
            .sum();
        let maximum_amplitude = if self.fast_mode {
            // the amplitude at zero frequency is usually the largest
            mel_cepstrum.iter().sum::<f64>() - gain
        } else {
            buffer.cepstrum.clear();
            buffer.cepstrum.extend_from_slice(mel_cepstrum);
            buffer.cepstrum[0] -= gain;
            self.fft.run(&buffer.cepstrum, &mut buffer.spectrum, &mut buffer.fft)?;
            buffer.amplitude.clear();
            buffer.amplitude.extend(buffer.spectrum.iter().map(|x| x.norm()));
            buffer.amplitude.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        };
        let is_stable = maximum_amplitude <= self.threshold;
        let report = StabilityReport { is_stable, maximum_amplitude };
        let Some(out) = modified else {
            return Ok(report);
        };
        if is_stable {
            *out = mel_cepstrum.to_vec();
            return Ok(report);
        }
        let scale = self.threshold / maximum_amplitude;
        if self.fast_mode {
            let mut scaled: Vec<f64> = mel_cepstrum.iter().map(|c| c * scale).collect();
            scaled[0] = (mel_cepstrum[0] - gain) * scale + gain;
            *out = scaled;
            return Ok(report);
        }
        match self.modification_type {
            ModificationType::Clipping => {
                for (x, &a) in buffer.spectrum.iter_mut().zip(buffer.amplitude.iter()) {
                    if self.threshold < a {
                        *x *= self.threshold / a;
                    }
                }
            }
            ModificationType::Scaling => buffer.spectrum.iter_mut().for_each(|x| *x *= scale),
        }
        self.fft.inverse(&buffer.spectrum, &mut buffer.restored, &mut buffer.fft)?;
        buffer.restored[0] += gain;
        *out = buffer.restored[..=self.num_order].to_vec();
        Ok(report)
    }
}
