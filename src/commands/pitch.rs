use super::{open_input, open_output, parse_double};
use anyhow::{bail, Context, Result};
use clap::Args;
use sptk::io::{read_all, write_vector};
use sptk::pitch::{Algorithm, PitchExtraction, PitchFrame};
use std::io::Write;
use std::path::PathBuf;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pitch,
    F0,
    LogF0,
}
impl TryFrom<u8> for OutputFormat {
    type Error = anyhow::Error;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(OutputFormat::Pitch),
            1 => Ok(OutputFormat::F0),
            2 => Ok(OutputFormat::LogF0),
            _ => bail!("The argument for the -o option must be 0, 1 or 2"),
        }
    }
}
impl OutputFormat {
    pub fn apply(self, frame: &PitchFrame, sampling_rate: f64) -> f64 {
        match self {
            OutputFormat::Pitch => frame.period(sampling_rate),
            OutputFormat::F0 => frame.f0,
            OutputFormat::LogF0 => frame.log_f0(),
        }
    }
}
#[derive(Args, Debug)]
pub struct PitchArgs {
    /// Algorithm (0 RAPT, 1 SWIPE', 2 REAPER, 3 WORLD, 4 HARVEST)
    #[arg(short = 'a', default_value_t = 1)]
    pub algorithm: u8,
    /// Frame shift [point]
    #[arg(short = 'p', default_value_t = 80)]
    pub frame_shift: usize,
    /// Sampling rate [kHz]
    #[arg(short = 's', default_value_t = 16.0, value_parser = parse_double)]
    pub sampling_rate: f64,
    /// Minimum F0 to search for [Hz]
    #[arg(short = 'L', default_value_t = 60.0, value_parser = parse_double)]
    pub lower_f0: f64,
    /// Maximum F0 to search for [Hz]
    #[arg(short = 'H', default_value_t = 240.0, value_parser = parse_double)]
    pub upper_f0: f64,
    /// Voicing threshold, the algorithm's default when omitted
    #[arg(short = 't', value_parser = parse_double, allow_hyphen_values = true)]
    pub voicing_threshold: Option<f64>,
    /// Output format (0 pitch, 1 F0, 2 log F0)
    #[arg(short = 'o', default_value_t = 0)]
    pub output_format: u8,
    /// Input waveform, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn resolve_voicing_threshold(algorithm: Algorithm, threshold: Option<f64>) -> Result<f64> {
    let Some(t) = threshold else {
        return Ok(algorithm.default_voicing_threshold());
    };
    match algorithm.voicing_threshold_range() {
        Some((lower, upper)) if (lower..=upper).contains(&t) => Ok(t),
        Some((lower, upper)) => bail!("Voicing threshold of {:?} must be in [{}, {}], got {}", algorithm, lower, upper, t),
        None => bail!("{:?} takes no voicing threshold", algorithm),
    }
}
pub fn run(args: PitchArgs) -> Result<()> {
    let algorithm = Algorithm::try_from(args.algorithm)?;
    let format = OutputFormat::try_from(args.output_format)?;
    let threshold = resolve_voicing_threshold(algorithm, args.voicing_threshold)?;
    let sampling_rate = 1000.0 * args.sampling_rate;
    let extraction = PitchExtraction::new(
        args.frame_shift,
        sampling_rate,
        args.lower_f0,
        args.upper_f0,
        threshold,
        algorithm,
    );
    if !extraction.is_valid() {
        bail!("Failed to initialize pitch extraction with {:?}", algorithm);
    }
    let mut input = open_input(args.infile.as_deref())?;
    let waveform = read_all::<f64, _>(&mut input).context("Failed to read waveform")?;
    if waveform.is_empty() {
        return Ok(());
    }
    let track = extraction.extract(&waveform).context("Failed to extract pitch")?;
    let values: Vec<f64> = track.frames.iter().map(|f| format.apply(f, sampling_rate)).collect();
    let mut output = open_output();
    write_vector(&values, &mut output).context("Failed to write pitch")?;
    output.flush()?;
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_output_format() -> Result<()> {
        let voiced = PitchFrame { f0: 200.0, epoch: None, correlation: None };
        assert_eq!(OutputFormat::try_from(0)?.apply(&voiced, 16000.0), 80.0);
        assert_eq!(OutputFormat::try_from(1)?.apply(&voiced, 16000.0), 200.0);
        assert_eq!(OutputFormat::try_from(2)?.apply(&voiced, 16000.0), 200f64.ln());
        assert_eq!(OutputFormat::Pitch.apply(&PitchFrame::unvoiced(), 16000.0), 0.0);
        assert_eq!(OutputFormat::LogF0.apply(&PitchFrame::unvoiced(), 16000.0), -1.0e10);
        assert!(OutputFormat::try_from(3).is_err());
        Ok(())
    }
    #[test]
    fn test_resolve_voicing_threshold() -> Result<()> {
        assert_eq!(resolve_voicing_threshold(Algorithm::Swipe, None)?, 0.3);
        assert_eq!(resolve_voicing_threshold(Algorithm::Reaper, None)?, 0.9);
        assert_eq!(resolve_voicing_threshold(Algorithm::Reaper, Some(-0.2))?, -0.2);
        assert!(resolve_voicing_threshold(Algorithm::Swipe, Some(0.9)).is_err());
        assert!(resolve_voicing_threshold(Algorithm::Harvest, Some(0.1)).is_err());
        Ok(())
    }
}
