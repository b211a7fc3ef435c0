//! Fundamental frequency estimation behind one façade.
pub mod reaper;
pub mod swipe;
use crate::consts::LOG_ZERO;
use crate::error::{Result, SptkError};
use reaper::PitchExtractionByReaper;
use swipe::PitchExtractionBySwipe;
use tracing::debug;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Rapt,
    Swipe,
    Reaper,
    World,
    Harvest,
}
impl TryFrom<u8> for Algorithm {
    type Error = SptkError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Algorithm::Rapt),
            1 => Ok(Algorithm::Swipe),
            2 => Ok(Algorithm::Reaper),
            3 => Ok(Algorithm::World),
            4 => Ok(Algorithm::Harvest),
            _ => Err(SptkError::invalid(format!("unknown pitch algorithm {}", value))),
        }
    }
}
impl Algorithm {
    /// Accepted voicing thresholds, `None` when the algorithm takes none.
    pub fn voicing_threshold_range(self) -> Option<(f64, f64)> {
        match self {
            Algorithm::Rapt => Some((-0.6, 0.7)),
            Algorithm::Swipe => Some((0.2, 0.5)),
            Algorithm::Reaper => Some((-0.5, 1.6)),
            Algorithm::World => Some((0.02, 0.2)),
            Algorithm::Harvest => None,
        }
    }
    pub fn default_voicing_threshold(self) -> f64 {
        match self {
            Algorithm::Rapt => 0.0,
            Algorithm::Swipe => 0.3,
            Algorithm::Reaper => 0.9,
            Algorithm::World => 0.1,
            Algorithm::Harvest => 0.0,
        }
    }
}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Polarity {
    #[default]
    Unknown,
    Positive,
    Negative,
}
/// One analysis frame. `f0 == 0` marks an unvoiced frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchFrame {
    pub f0: f64,
    pub epoch: Option<f64>,
    pub correlation: Option<f64>,
}
impl PitchFrame {
    pub fn unvoiced() -> Self {
        Self { f0: 0.0, epoch: None, correlation: None }
    }
    pub fn is_voiced(&self) -> bool {
        self.f0 > 0.0
    }
    /// Period in samples, 0 when unvoiced.
    pub fn period(&self, sampling_rate: f64) -> f64 {
        if self.is_voiced() { sampling_rate / self.f0 } else { 0.0 }
    }
    pub fn log_f0(&self) -> f64 {
        if self.is_voiced() { self.f0.ln() } else { LOG_ZERO }
    }
}
#[derive(Debug, Clone, Default)]
pub struct PitchTrack {
    pub frames: Vec<PitchFrame>,
    /// Voiced epoch times in seconds.
    pub epochs: Vec<f64>,
    pub polarity: Polarity,
}
pub trait PitchExtractor {
    fn is_valid(&self) -> bool;
    fn extract(&self, waveform: &[f64]) -> Result<PitchTrack>;
}
/// Owns the extractor chosen by [`Algorithm`]. RAPT, WORLD and HARVEST are
/// recognised but not provided, so the façade is invalid for them.
pub struct PitchExtraction {
    frame_shift: usize,
    algorithm: Algorithm,
    extractor: Option<Box<dyn PitchExtractor>>,
}
impl PitchExtraction {
    pub fn new(
        frame_shift: usize,
        sampling_rate: f64,
        lower_f0: f64,
        upper_f0: f64,
        voicing_threshold: f64,
        algorithm: Algorithm,
    ) -> Self {
        let extractor: Option<Box<dyn PitchExtractor>> = match algorithm {
            Algorithm::Swipe => Some(Box::new(PitchExtractionBySwipe::new(
                frame_shift,
                sampling_rate,
                lower_f0,
                upper_f0,
                voicing_threshold,
            ))),
            Algorithm::Reaper => Some(Box::new(PitchExtractionByReaper::new(
                frame_shift,
                sampling_rate,
                lower_f0,
                upper_f0,
                voicing_threshold,
            ))),
            Algorithm::Rapt | Algorithm::World | Algorithm::Harvest => None,
        };
        Self { frame_shift, algorithm, extractor }
    }
    /// Wraps a caller-provided extractor.
    pub fn with_extractor(frame_shift: usize, algorithm: Algorithm, extractor: Box<dyn PitchExtractor>) -> Self {
        Self { frame_shift, algorithm, extractor: Some(extractor) }
    }
    pub fn is_valid(&self) -> bool {
        self.frame_shift > 0 && self.extractor.as_ref().is_some_and(|e| e.is_valid())
    }
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
    /// Runs the extractor and fits its frames to `ceil(len / frame_shift)`,
    /// repeating the last frame or dropping the excess.
    pub fn extract(&self, waveform: &[f64]) -> Result<PitchTrack> {
        let extractor = match &self.extractor {
            Some(e) if self.frame_shift > 0 && e.is_valid() => e,
            _ => return Err(SptkError::NotInitialized("pitch extraction")),
        };
        if waveform.is_empty() {
            return Err(SptkError::EmptyInput);
        }
        let mut track = extractor.extract(waveform)?;
        let target = waveform.len().div_ceil(self.frame_shift);
        let produced = track.frames.len();
        let last = track.frames.last().copied().unwrap_or_else(PitchFrame::unvoiced);
        track.frames.resize(target, last);
        debug!(
            "{:?}: {} frames produced, {} voiced of {}",
            self.algorithm,
            produced,
            track.frames.iter().filter(|f| f.is_voiced()).count(),
            target
        );
        Ok(track)
    }
    /// Writes F0 in Hz with 0 for unvoiced frames. Epochs and polarity are
    /// only filled by extractors that track them.
    pub fn run(
        &self,
        waveform: &[f64],
        f0: &mut Vec<f64>,
        epochs: Option<&mut Vec<f64>>,
        polarity: Option<&mut Polarity>,
    ) -> Result<()> {
        let track = self.extract(waveform)?;
        *f0 = track.frames.iter().map(|f| f.f0).collect();
        if let Some(out) = epochs {
            *out = track.epochs;
        }
        if let Some(out) = polarity {
            *out = track.polarity;
        }
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn sawtooth(f0: f64, fs: f64, len: usize) -> Vec<f64> {
        (0..len).map(|i| 8000.0 * (2.0 * (i as f64 * f0 / fs).fract() - 1.0)).collect()
    }
    #[test]
    fn test_output_length() -> Result<()> {
        let signal = sawtooth(150.0, 16000.0, 4010);
        for algorithm in [Algorithm::Swipe, Algorithm::Reaper] {
            let threshold = algorithm.default_voicing_threshold();
            let pitch = PitchExtraction::new(80, 16000.0, 60.0, 240.0, threshold, algorithm);
            assert!(pitch.is_valid());
            let mut f0 = Vec::new();
            pitch.run(&signal, &mut f0, None, None)?;
            assert_eq!(f0.len(), 51);
            assert!(f0.iter().all(|&v| v == 0.0 || (60.0..=240.0).contains(&v)), "{:?}", f0);
        }
        Ok(())
    }
    struct Fixed(Vec<f64>);
    impl PitchExtractor for Fixed {
        fn is_valid(&self) -> bool {
            true
        }
        fn extract(&self, _: &[f64]) -> Result<PitchTrack> {
            let frames = self.0.iter().map(|&f0| PitchFrame { f0, epoch: None, correlation: None }).collect();
            Ok(PitchTrack { frames, ..PitchTrack::default() })
        }
    }
    fn fitted(values: &[f64], len: usize) -> Result<Vec<f64>> {
        let pitch = PitchExtraction::with_extractor(80, Algorithm::Swipe, Box::new(Fixed(values.to_vec())));
        let mut f0 = Vec::new();
        pitch.run(&vec![0.0; len], &mut f0, None, None)?;
        Ok(f0)
    }
    #[test]
    fn test_surplus_frames_are_dropped() -> Result<()> {
        assert_eq!(fitted(&[100.0, 110.0, 120.0, 130.0, 140.0], 240)?, vec![100.0, 110.0, 120.0]);
        assert_eq!(fitted(&[100.0, 110.0, 120.0], 161)?, vec![100.0, 110.0, 120.0]);
        Ok(())
    }
    #[test]
    fn test_padding_repeats_last_frame() -> Result<()> {
        assert_eq!(fitted(&[100.0, 150.0], 400)?, vec![100.0, 150.0, 150.0, 150.0, 150.0]);
        assert_eq!(fitted(&[100.0, 0.0], 400)?, vec![100.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(fitted(&[], 170)?, vec![0.0, 0.0, 0.0]);
        Ok(())
    }
    #[test]
    fn test_short_input_is_padded() -> Result<()> {
        let pitch = PitchExtraction::new(80, 16000.0, 60.0, 240.0, 0.3, Algorithm::Swipe);
        let mut f0 = vec![1.0];
        pitch.run(&[100.0; 40], &mut f0, None, None)?;
        assert_eq!(f0, vec![0.0]);
        Ok(())
    }
    #[test]
    fn test_epochs_and_polarity_only_from_reaper() -> Result<()> {
        let signal = sawtooth(125.0, 16000.0, 3200);
        let pitch = PitchExtraction::new(80, 16000.0, 60.0, 240.0, 0.3, Algorithm::Swipe);
        let mut f0 = Vec::new();
        let mut epochs = vec![1.0];
        let mut polarity = Polarity::Positive;
        pitch.run(&signal, &mut f0, Some(&mut epochs), Some(&mut polarity))?;
        assert!(epochs.is_empty());
        assert_eq!(polarity, Polarity::Unknown);
        Ok(())
    }
    #[test]
    fn test_rejections() {
        let mut f0 = Vec::new();
        for algorithm in [Algorithm::Rapt, Algorithm::World, Algorithm::Harvest] {
            let pitch = PitchExtraction::new(80, 16000.0, 60.0, 240.0, 0.1, algorithm);
            assert!(!pitch.is_valid());
            assert!(matches!(pitch.run(&[1.0; 160], &mut f0, None, None), Err(SptkError::NotInitialized(_))));
        }
        let pitch = PitchExtraction::new(80, 16000.0, 60.0, 240.0, 0.9, Algorithm::Reaper);
        assert!(matches!(pitch.run(&[], &mut f0, None, None), Err(SptkError::EmptyInput)));
        assert!(!PitchExtraction::new(80, 16000.0, 60.0, 240.0, 0.9, Algorithm::Swipe).is_valid());
        assert_eq!(Algorithm::try_from(2).ok(), Some(Algorithm::Reaper));
        assert!(Algorithm::try_from(5).is_err());
    }
    #[test]
    fn test_frame_helpers() {
        let voiced = PitchFrame { f0: 100.0, epoch: None, correlation: None };
        assert_eq!(voiced.period(16000.0), 160.0);
        assert!((voiced.log_f0() - 100f64.ln()).abs() < 1e-15);
        assert_eq!(PitchFrame::unvoiced().log_f0(), LOG_ZERO);
        assert_eq!(PitchFrame::unvoiced().period(16000.0), 0.0);
    }
}
