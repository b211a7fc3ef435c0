//! Gain and frequency representations of LSP frames at the stream boundary.
//!
//! Kernels always work on `[K, w(1), ..., w(M)]` with a linear gain and
//! frequencies in radians.
use crate::error::{Result, SptkError};
use std::f64::consts::PI;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainType {
    Linear,
    Log,
    None,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyFormat {
    Radian,
    Cycle,
    Kilohertz,
    Hertz,
}
impl TryFrom<u8> for GainType {
    type Error = SptkError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(GainType::Linear),
            1 => Ok(GainType::Log),
            2 => Ok(GainType::None),
            _ => Err(SptkError::invalid(format!("unknown gain type {}", value))),
        }
    }
}
impl TryFrom<u8> for FrequencyFormat {
    type Error = SptkError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(FrequencyFormat::Radian),
            1 => Ok(FrequencyFormat::Cycle),
            2 => Ok(FrequencyFormat::Kilohertz),
            3 => Ok(FrequencyFormat::Hertz),
            _ => Err(SptkError::invalid(format!("unknown frequency format {}", value))),
        }
    }
}
impl FrequencyFormat {
    /// Multiplier from radians to this format at `sampling_rate_khz`.
    fn scale(self, sampling_rate_khz: f64) -> f64 {
        match self {
            FrequencyFormat::Radian => 1.0,
            FrequencyFormat::Cycle => 0.5 / PI,
            FrequencyFormat::Kilohertz => 0.5 * sampling_rate_khz / PI,
            FrequencyFormat::Hertz => 500.0 * sampling_rate_khz / PI,
        }
    }
}
/// Converts a canonical LSP frame into its stream representation.
/// With `GainType::None` the gain is dropped and the frame shrinks by one.
pub fn to_stream(lsp: &[f64], gain: GainType, format: FrequencyFormat, sampling_rate_khz: f64) -> Vec<f64> {
    let scale = format.scale(sampling_rate_khz);
    let freqs = lsp.iter().skip(1).map(|w| w * scale);
    match (gain, lsp.first()) {
        (GainType::Linear, Some(&k)) => std::iter::once(k).chain(freqs).collect(),
        (GainType::Log, Some(&k)) => std::iter::once(crate::utils::floor_log(k)).chain(freqs).collect(),
        _ => freqs.collect(),
    }
}
/// Converts a stream frame back to the canonical `[K, w(1), ..., w(M)]`.
/// With `GainType::None` the input holds only frequencies and `K = 1`.
pub fn from_stream(frame: &[f64], gain: GainType, format: FrequencyFormat, sampling_rate_khz: f64) -> Vec<f64> {
    let scale = 1.0 / format.scale(sampling_rate_khz);
    let (k, freqs) = match gain {
        GainType::Linear => (frame.first().copied().unwrap_or(1.0), frame.get(1..).unwrap_or(&[])),
        GainType::Log => (frame.first().map(|x| x.exp()).unwrap_or(1.0), frame.get(1..).unwrap_or(&[])),
        GainType::None => (1.0, frame),
    };
    std::iter::once(k).chain(freqs.iter().map(|w| w * scale)).collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_frequency_formats() {
        let lsp = [2.0, PI / 2.0, PI];
        assert_eq!(to_stream(&lsp, GainType::Linear, FrequencyFormat::Radian, 16.0), lsp.to_vec());
        let cyc = to_stream(&lsp, GainType::Linear, FrequencyFormat::Cycle, 16.0);
        assert!((cyc[1] - 0.25).abs() < 1e-15 && (cyc[2] - 0.5).abs() < 1e-15);
        let khz = to_stream(&lsp, GainType::None, FrequencyFormat::Kilohertz, 16.0);
        assert_eq!(khz.len(), 2);
        assert!((khz[1] - 8.0).abs() < 1e-12);
        let hz = to_stream(&lsp, GainType::Linear, FrequencyFormat::Hertz, 16.0);
        assert!((hz[1] - 4000.0).abs() < 1e-9);
    }
    #[test]
    fn test_gain_round_trip() {
        let lsp = [0.5, 0.3, 1.1, 2.0];
        for gain in [GainType::Linear, GainType::Log] {
            for format in [FrequencyFormat::Radian, FrequencyFormat::Cycle, FrequencyFormat::Kilohertz, FrequencyFormat::Hertz] {
                let restored = from_stream(&to_stream(&lsp, gain, format, 10.0), gain, format, 10.0);
                for (a, b) in lsp.iter().zip(restored.iter()) {
                    assert!((a - b).abs() < 1e-12, "{:?} {:?}: {} vs {}", gain, format, a, b);
                }
            }
        }
        let linear = to_stream(&lsp, GainType::Linear, FrequencyFormat::Radian, 10.0);
        assert_eq!(linear[0], 0.5);
        let no_gain = from_stream(&[0.3, 1.1, 2.0], GainType::None, FrequencyFormat::Radian, 10.0);
        assert_eq!(no_gain, vec![1.0, 0.3, 1.1, 2.0]);
    }
    #[test]
    fn test_codes() {
        assert_eq!(GainType::try_from(1).ok(), Some(GainType::Log));
        assert!(GainType::try_from(3).is_err());
        assert_eq!(FrequencyFormat::try_from(3).ok(), Some(FrequencyFormat::Hertz));
        assert!(FrequencyFormat::try_from(4).is_err());
    }
}
