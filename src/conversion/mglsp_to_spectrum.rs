use crate::consts::{LOG_TWO, NEPER};
use crate::error::{check_length, Result, SptkError};
use crate::utils::{add_in_log_space, floor_log};
use std::f64::consts::PI;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumFormat {
    LogAmplitudeInDecibels,
    LogAmplitude,
    Amplitude,
    Power,
}
impl TryFrom<u8> for SpectrumFormat {
    type Error = SptkError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SpectrumFormat::LogAmplitudeInDecibels),
            1 => Ok(SpectrumFormat::LogAmplitude),
            2 => Ok(SpectrumFormat::Amplitude),
            3 => Ok(SpectrumFormat::Power),
            _ => Err(SptkError::invalid(format!("unknown spectrum format {}", value))),
        }
    }
}
impl SpectrumFormat {
    /// Maps a natural-log amplitude to this format.
    pub fn apply(self, log_amplitude: f64) -> f64 {
        match self {
            SpectrumFormat::LogAmplitudeInDecibels => log_amplitude * NEPER,
            SpectrumFormat::LogAmplitude => log_amplitude,
            SpectrumFormat::Amplitude => log_amplitude.exp(),
            SpectrumFormat::Power => (2.0 * log_amplitude).exp(),
        }
    }
}
/// Mel-generalized LSP `[K, w(1), ..., w(M)]` (radians) to the natural-log
/// amplitude spectrum at `L/2 + 1` evenly spaced bins of `[0, pi]`.
#[derive(Debug, Clone)]
pub struct MglspToSpectrum {
    num_order: usize,
    alpha: f64,
    gamma: f64,
    fft_length: usize,
    is_valid: bool,
}
impl MglspToSpectrum {
    pub fn new(num_order: usize, alpha: f64, gamma: f64, fft_length: usize) -> Self {
        let is_valid = alpha.abs() < 1.0
            && (-1.0..0.0).contains(&gamma)
            && fft_length >= 2
            && fft_length % 2 == 0;
        Self { num_order, alpha, gamma, fft_length, is_valid }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    pub fn output_length(&self) -> usize {
        self.fft_length / 2 + 1
    }
    fn warp(&self, omega: f64) -> f64 {
        if self.alpha == 0.0 {
            return omega;
        }
        omega + 2.0 * (self.alpha * omega.sin() / (1.0 - self.alpha * omega.cos())).atan()
    }
    pub fn run(&self, mglsp: &[f64], spectrum: &mut Vec<f64>) -> Result<()> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("mel-generalized lsp to spectrum"));
        }
        let m = self.num_order;
        check_length(m + 1, mglsp.len())?;
        let is_odd = m % 2 == 1;
        let c1 = if is_odd { (m - 1) as f64 * LOG_TWO } else { m as f64 * LOG_TWO };
        let c2 = 0.5 / self.gamma;
        let log_gain = floor_log(mglsp[0]);
        let half = self.fft_length / 2;
        let delta = PI / half as f64;
        let cosines: Vec<f64> = mglsp[1..].iter().map(|w| w.cos()).collect();
        spectrum.clear();
        for j in 0..=half {
            let warped = self.warp(j as f64 * delta);
            let cos_omega = warped.cos();
            // cosines[i] holds w(i + 1), so even positions are odd lsp indices
            let mut p = 0.0;
            let mut q = 0.0;
            for (i, c) in cosines.iter().enumerate() {
                let term = 2.0 * floor_log((cos_omega - c).abs());
                if i % 2 == 0 { q += term } else { p += term }
            }
            if is_odd {
                p += 2.0 * floor_log(warped.sin());
            } else {
                p += 2.0 * floor_log((0.5 * warped).sin());
                q += 2.0 * floor_log((0.5 * warped).cos());
            }
            spectrum.push(log_gain + c2 * (c1 + add_in_log_space(p, q)));
        }
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::lsp_to_lpc::{LspToLpc, LspToLpcBuffer};
    use num_complex::Complex64;
    fn log_inverse_amplitude(lpc: &[f64], omega: f64) -> f64 {
        let a: Complex64 = lpc[1..]
            .iter()
            .enumerate()
            .fold(Complex64::new(1.0, 0.0), |acc, (i, &ai)| acc + Complex64::from_polar(ai, -omega * (i + 1) as f64));
        lpc[0].ln() - a.norm().ln()
    }
    #[test]
    fn test_matches_all_pole_response() -> Result<()> {
        for lsp in [vec![1.5, 1.0471975511965976], vec![0.8, 0.6, 1.8], vec![1.0, 0.3, 0.9, 1.7, 2.5]] {
            let m = lsp.len() - 1;
            let mut lpc = Vec::new();
            LspToLpc::new(m).run(&lsp, &mut lpc, &mut LspToLpcBuffer::default())?;
            let kernel = MglspToSpectrum::new(m, 0.0, -1.0, 16);
            let mut spectrum = Vec::new();
            kernel.run(&lsp, &mut spectrum)?;
            assert_eq!(spectrum.len(), 9);
            for (j, s) in spectrum.iter().enumerate().skip(1).take(7) {
                let expected = log_inverse_amplitude(&lpc, j as f64 * PI / 8.0);
                assert!((s - expected).abs() < 1e-9, "M={} bin {}: {} vs {}", m, j, s, expected);
            }
        }
        Ok(())
    }
    #[test]
    fn test_flat_spectrum() -> Result<()> {
        let mut spectrum = Vec::new();
        MglspToSpectrum::new(0, 0.0, -1.0, 8).run(&[2.0], &mut spectrum)?;
        assert!(spectrum.iter().all(|s| (s - 2f64.ln()).abs() < 1e-12), "{:?}", spectrum);
        let m = 4;
        let mut lsp = vec![1.0];
        lsp.extend((1..=m).map(|i| i as f64 * PI / (m + 1) as f64));
        MglspToSpectrum::new(m, 0.0, -1.0, 8).run(&lsp, &mut spectrum)?;
        assert!(spectrum[1..4].iter().all(|s| s.abs() < 1e-9), "{:?}", spectrum);
        Ok(())
    }
    #[test]
    fn test_warping_keeps_edges() -> Result<()> {
        let lsp = [1.0, 0.6, 1.8];
        let mut plain = Vec::new();
        let mut warped = Vec::new();
        MglspToSpectrum::new(2, 0.0, -0.5, 16).run(&lsp, &mut plain)?;
        MglspToSpectrum::new(2, 0.42, -0.5, 16).run(&lsp, &mut warped)?;
        assert!((plain[0] - warped[0]).abs() < 1e-9);
        assert!((plain[8] - warped[8]).abs() < 1e-6);
        assert!((plain[4] - warped[4]).abs() > 1e-6);
        Ok(())
    }
    #[test]
    fn test_formats_and_validity() {
        assert!((SpectrumFormat::LogAmplitudeInDecibels.apply(1.0) - NEPER).abs() < 1e-12);
        assert!((SpectrumFormat::Power.apply(0.5) - 1f64.exp()).abs() < 1e-12);
        assert_eq!(SpectrumFormat::try_from(2).ok(), Some(SpectrumFormat::Amplitude));
        assert!(!MglspToSpectrum::new(2, 0.0, 0.0, 16).is_valid());
        assert!(!MglspToSpectrum::new(2, 1.0, -1.0, 16).is_valid());
        assert!(!MglspToSpectrum::new(2, 0.0, -1.0, 15).is_valid());
        let mut out = vec![7.0];
        assert!(MglspToSpectrum::new(2, 0.0, -1.0, 16).run(&[1.0, 0.5], &mut out).is_err());
        assert_eq!(out, vec![7.0]);
    }
}
