//! Epoch tracker in the manner of REAPER.
//!
//! The waveform is truncated to 16-bit samples, high-passed and inverse
//! filtered by frame-wise LPC. The skew of the residual decides the
//! polarity, which must be known before the periodicity features are
//! computed. A Viterbi search over normalized cross-correlation peaks marks
//! voiced frames, and glottal epochs are placed at residual peaks inside
//! them.
use super::{PitchExtractor, PitchFrame, PitchTrack, Polarity};
use crate::consts::{MAX_SAMPLING_RATE, MIN_SAMPLING_RATE};
use crate::error::{Result, SptkError};
use crate::math::levinson::{LevinsonBuffer, LevinsonDurbin};
use crate::statistics::Autocorrelation;
use crate::utils::stft::hann_window;
use biquad::{Biquad, Coefficients, DirectForm1, ToHertz};
use tracing::debug;
const HIGHPASS_CUTOFF_HZ: f64 = 40.0;
const Q_HIGHPASS: f64 = 0.7071067811865476;
const INTERNAL_FRAME_INTERVAL: f64 = 0.005;
const LPC_WINDOW_DURATION: f64 = 0.02;
const NCCF_WINDOW_DURATION: f64 = 0.01;
const WHITE_NOISE_CORRECTION: f64 = 1e-6;
const MAX_CANDIDATES: usize = 4;
const LAG_WEIGHT: f64 = 0.3;
const VOICING_TRANSITION_COST: f64 = 0.2;
const FREQUENCY_TRANSITION_COST: f64 = 0.4;
const EPOCH_SEARCH_RANGE: (f64, f64) = (0.7, 1.3);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Loaded,
    PolarityKnown,
    FeaturesReady,
    Tracked,
}
#[derive(Debug, Clone, Copy)]
struct Candidate {
    lag: usize,
    nccf: f64,
}
#[derive(Debug, Clone, Copy)]
struct TrackedFrame {
    lag: usize,
    nccf: f64,
    voiced: bool,
}
#[derive(Debug, Clone, Copy)]
struct Epoch {
    sample: usize,
    segment: usize,
}
#[inline]
fn create_highpass_coeffs(sampling_rate: f64, cutoff: f64) -> Result<Coefficients<f64>> {
    Coefficients::<f64>::from_params(biquad::Type::HighPass, sampling_rate.hz(), cutoff.hz(), Q_HIGHPASS)
        .map_err(|e| SptkError::numeric(format!("highpass design failed: {:?}", e)))
}
fn highpass(signal: &mut [f64], sampling_rate: f64) -> Result<()> {
    let mut filter = DirectForm1::<f64>::new(create_highpass_coeffs(sampling_rate, HIGHPASS_CUTOFF_HZ)?);
    for sample in signal.iter_mut() {
        *sample = filter.run(*sample);
    }
    Ok(())
}
/// Inverse filters each hop with LPC estimated on a Hann window centred on it.
fn lpc_residual(signal: &[f64], sampling_rate: f64, hop: usize) -> Result<Vec<f64>> {
    let order = 2 + (sampling_rate / 1000.0).round() as usize;
    let window_length = (LPC_WINDOW_DURATION * sampling_rate).round() as usize;
    let window = hann_window(window_length);
    let autocorrelation = Autocorrelation::new(window_length, order);
    let levinson = LevinsonDurbin::new(order);
    let mut buffer = LevinsonBuffer::default();
    let mut frame = vec![0.0; window_length];
    let (mut r, mut lpc) = (Vec::new(), Vec::new());
    let mut residual = vec![0.0; signal.len()];
    for start in (0..signal.len()).step_by(hop) {
        let offset = (start + hop / 2) as isize - (window_length / 2) as isize;
        for (j, v) in frame.iter_mut().enumerate() {
            let pos = offset + j as isize;
            *v = if pos >= 0 && (pos as usize) < signal.len() { signal[pos as usize] * window[j] } else { 0.0 };
        }
        autocorrelation.run(&frame, &mut r)?;
        if r[0] <= 0.0 {
            continue;
        }
        r[0] *= 1.0 + WHITE_NOISE_CORRECTION;
        levinson.run(&r, &mut lpc, &mut buffer)?;
        for n in start..(start + hop).min(signal.len()) {
            let prediction: f64 = (1..=order.min(n)).map(|i| lpc[i] * signal[n - i]).sum();
            residual[n] = signal[n] + prediction;
        }
    }
    Ok(residual)
}
/// State 0 is unvoiced, state `i` is candidate `i - 1`.
fn state(frame: &[Candidate], s: usize) -> Option<&Candidate> {
    s.checked_sub(1).and_then(|i| frame.get(i))
}
/// Epoch tracking state machine. Each stage requires the previous one.
struct EpochTracker {
    sampling_rate: f64,
    lower_f0: f64,
    upper_f0: f64,
    min_lag: usize,
    max_lag: usize,
    hop: usize,
    unvoiced_cost: f64,
    signal: Vec<f64>,
    residual: Vec<f64>,
    polarity: Polarity,
    candidates: Vec<Vec<Candidate>>,
    frames: Vec<TrackedFrame>,
    epochs: Vec<Epoch>,
    stage: Stage,
}
impl EpochTracker {
    fn init(waveform: &[i16], sampling_rate: f64, lower_f0: f64, upper_f0: f64, unvoiced_cost: f64) -> Result<Self> {
        let mut signal: Vec<f64> = waveform.iter().map(|&x| x as f64).collect();
        highpass(&mut signal, sampling_rate)?;
        Ok(Self {
            sampling_rate,
            lower_f0,
            upper_f0,
            min_lag: ((sampling_rate / upper_f0).floor() as usize).max(1),
            max_lag: (sampling_rate / lower_f0).ceil() as usize,
            hop: ((INTERNAL_FRAME_INTERVAL * sampling_rate).round() as usize).max(1),
            unvoiced_cost,
            signal,
            residual: Vec::new(),
            polarity: Polarity::Unknown,
            candidates: Vec::new(),
            frames: Vec::new(),
            epochs: Vec::new(),
            stage: Stage::Loaded,
        })
    }
    fn require(&self, stage: Stage, name: &'static str) -> Result<()> {
        if self.stage < stage {
            return Err(SptkError::NotInitialized(name));
        }
        Ok(())
    }
    /// Decides the polarity from the residual skew and flips the residual
    /// so that epochs appear as positive peaks.
    fn compute_polarity(&mut self) -> Result<Polarity> {
        let mut residual = lpc_residual(&self.signal, self.sampling_rate, self.hop)?;
        let (m2, m3) = residual.iter().fold((0.0, 0.0), |(a, b), r| (a + r * r, b + r * r * r));
        self.polarity = if m2 == 0.0 {
            Polarity::Unknown
        } else if m3 >= 0.0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        };
        if m2 > 0.0 {
            let n = residual.len() as f64;
            debug!("residual skew = {:.3}", (m3 / n) / (m2 / n).powf(1.5));
        }
        if self.polarity == Polarity::Negative {
            residual.iter_mut().for_each(|r| *r = -*r);
        }
        self.residual = residual;
        self.stage = Stage::PolarityKnown;
        Ok(self.polarity)
    }
    fn compute_features(&mut self) -> Result<()> {
        self.require(Stage::PolarityKnown, "epoch tracker polarity")?;
        let x = &self.signal;
        let window = ((NCCF_WINDOW_DURATION * self.sampling_rate).round() as usize).max(1);
        let num_frames = x.len().div_ceil(self.hop);
        let mut nccf = Vec::with_capacity(self.max_lag - self.min_lag + 1);
        self.candidates.clear();
        for f in 0..num_frames {
            let start = f * self.hop;
            nccf.clear();
            let e0: f64 = x[start..(start + window).min(x.len())].iter().map(|v| v * v).sum();
            for lag in self.min_lag..=self.max_lag {
                if start + lag + window > x.len() || e0 == 0.0 {
                    nccf.push(0.0);
                    continue;
                }
                let reference = &x[start..start + window];
                let shifted = &x[start + lag..start + lag + window];
                let cross: f64 = reference.iter().zip(shifted).map(|(a, b)| a * b).sum();
                let e1: f64 = shifted.iter().map(|v| v * v).sum();
                nccf.push(if e1 > 0.0 { cross / (e0 * e1).sqrt() } else { 0.0 });
            }
            let mut peaks: Vec<Candidate> = (1..nccf.len().saturating_sub(1))
                .filter(|&i| nccf[i] > 0.0 && nccf[i] > nccf[i - 1] && nccf[i] >= nccf[i + 1])
                .map(|i| Candidate { lag: self.min_lag + i, nccf: nccf[i] })
                .collect();
            peaks.sort_by(|a, b| b.nccf.total_cmp(&a.nccf));
            peaks.truncate(MAX_CANDIDATES);
            self.candidates.push(peaks);
        }
        self.stage = Stage::FeaturesReady;
        Ok(())
    }
    fn voiced_cost(&self, candidate: &Candidate) -> f64 {
        1.0 - candidate.nccf * (1.0 - LAG_WEIGHT * candidate.lag as f64 / self.max_lag as f64)
    }
    fn transition_cost(previous: Option<&Candidate>, current: Option<&Candidate>) -> f64 {
        match (previous, current) {
            (None, None) => 0.0,
            (Some(a), Some(b)) => FREQUENCY_TRANSITION_COST * (a.lag as f64 / b.lag as f64).ln().abs(),
            _ => VOICING_TRANSITION_COST,
        }
    }
    /// Viterbi decoding of the voicing and lag sequence, then epoch placement.
    fn track_epochs(&mut self) -> Result<()> {
        self.require(Stage::FeaturesReady, "epoch tracker features")?;
        let mut cost: Vec<f64> = Vec::new();
        let mut backpointers: Vec<Vec<usize>> = Vec::with_capacity(self.candidates.len());
        for (t, frame) in self.candidates.iter().enumerate() {
            let local = std::iter::once(self.unvoiced_cost).chain(frame.iter().map(|c| self.voiced_cost(c)));
            if t == 0 {
                cost = local.collect();
                backpointers.push(vec![0; cost.len()]);
                continue;
            }
            let previous = &self.candidates[t - 1];
            let mut next = Vec::with_capacity(frame.len() + 1);
            let mut pointers = Vec::with_capacity(frame.len() + 1);
            for (s, c) in local.enumerate() {
                let (best, total) = cost
                    .iter()
                    .enumerate()
                    .map(|(p, acc)| (p, acc + Self::transition_cost(state(previous, p), state(frame, s))))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .unwrap_or((0, 0.0));
                next.push(total + c);
                pointers.push(best);
            }
            cost = next;
            backpointers.push(pointers);
        }
        let mut s = cost.iter().enumerate().min_by(|a, b| a.1.total_cmp(b.1)).map_or(0, |(i, _)| i);
        let mut frames = vec![TrackedFrame { lag: self.max_lag, nccf: 0.0, voiced: false }; self.candidates.len()];
        for t in (0..self.candidates.len()).rev() {
            let frame = &self.candidates[t];
            frames[t] = match state(frame, s) {
                Some(c) => TrackedFrame { lag: c.lag, nccf: c.nccf, voiced: true },
                None => TrackedFrame {
                    lag: frame.first().map_or(self.max_lag, |c| c.lag),
                    nccf: frame.first().map_or(0.0, |c| c.nccf),
                    voiced: false,
                },
            };
            s = backpointers[t][s];
        }
        self.frames = frames;
        self.place_epochs();
        self.stage = Stage::Tracked;
        Ok(())
    }
    fn argmax_residual(&self, lo: usize, hi: usize) -> usize {
        (lo..hi).max_by(|&a, &b| self.residual[a].total_cmp(&self.residual[b])).unwrap_or(lo)
    }
    fn place_epochs(&mut self) {
        self.epochs.clear();
        let len = self.residual.len();
        let mut segment = 0;
        let mut f = 0;
        while f < self.frames.len() {
            if !self.frames[f].voiced {
                f += 1;
                continue;
            }
            let first = f;
            while f < self.frames.len() && self.frames[f].voiced {
                f += 1;
            }
            let begin = first * self.hop;
            let end = (f * self.hop).min(len);
            let mut epoch = self.argmax_residual(begin, (begin + self.frames[first].lag).min(end));
            loop {
                self.epochs.push(Epoch { sample: epoch, segment });
                let lag = self.frames[(epoch / self.hop).min(f - 1)].lag as f64;
                let lo = epoch + (EPOCH_SEARCH_RANGE.0 * lag).round() as usize;
                let hi = (epoch + (EPOCH_SEARCH_RANGE.1 * lag).round() as usize + 1).min(end);
                if lo >= hi {
                    break;
                }
                epoch = self.argmax_residual(lo, hi);
            }
            segment += 1;
        }
    }
    fn voiced_epochs(&self) -> Result<Vec<f64>> {
        self.require(Stage::Tracked, "epoch tracker epochs")?;
        Ok(self.epochs.iter().map(|e| e.sample as f64 / self.sampling_rate).collect())
    }
    /// F0 at every multiple of `frame_shift` samples from the local epoch
    /// interval, or from the frame lag at segment borders.
    fn resample(&self, frame_shift: usize, num_frames: usize) -> Result<Vec<PitchFrame>> {
        self.require(Stage::Tracked, "epoch tracker f0")?;
        let Some(last) = self.frames.len().checked_sub(1) else {
            return Ok(vec![PitchFrame::unvoiced(); num_frames]);
        };
        Ok((0..num_frames)
            .map(|i| {
                let position = i * frame_shift;
                let frame = self.frames[((position as f64 / self.hop as f64).round() as usize).min(last)];
                if !frame.voiced {
                    return PitchFrame { correlation: Some(frame.nccf), ..PitchFrame::unvoiced() };
                }
                let k = self.epochs.partition_point(|e| e.sample <= position);
                let interval = (k >= 1 && k < self.epochs.len())
                    .then(|| (self.epochs[k - 1], self.epochs[k]))
                    .filter(|(a, b)| a.segment == b.segment);
                match interval {
                    Some((a, b)) => PitchFrame {
                        f0: (self.sampling_rate / (b.sample - a.sample) as f64).clamp(self.lower_f0, self.upper_f0),
                        epoch: Some(a.sample as f64 / self.sampling_rate),
                        correlation: Some(frame.nccf),
                    },
                    None => PitchFrame {
                        f0: (self.sampling_rate / frame.lag as f64).clamp(self.lower_f0, self.upper_f0),
                        epoch: None,
                        correlation: Some(frame.nccf),
                    },
                }
            })
            .collect())
    }
}
#[derive(Debug, Clone)]
pub struct PitchExtractionByReaper {
    frame_shift: usize,
    sampling_rate: f64,
    lower_f0: f64,
    upper_f0: f64,
    voicing_threshold: f64,
    is_valid: bool,
}
impl PitchExtractionByReaper {
    pub fn new(frame_shift: usize, sampling_rate: f64, lower_f0: f64, upper_f0: f64, voicing_threshold: f64) -> Self {
        let is_valid = frame_shift > 0
            && upper_f0 < 0.5 * sampling_rate
            && MIN_SAMPLING_RATE < sampling_rate
            && sampling_rate < MAX_SAMPLING_RATE
            && 10.0 < lower_f0
            && lower_f0 < upper_f0
            && (-0.5..=1.6).contains(&voicing_threshold);
        Self { frame_shift, sampling_rate, lower_f0, upper_f0, voicing_threshold, is_valid }
    }
    /// Higher thresholds make the unvoiced hypothesis more expensive.
    fn unvoiced_cost(&self) -> f64 {
        0.25 * self.voicing_threshold + 0.3
    }
}
impl PitchExtractor for PitchExtractionByReaper {
    fn is_valid(&self) -> bool {
        self.is_valid
    }
    fn extract(&self, waveform: &[f64]) -> Result<PitchTrack> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("reaper"));
        }
        if waveform.is_empty() {
            return Err(SptkError::EmptyInput);
        }
        let integer: Vec<i16> = waveform.iter().map(|&x| x as i16).collect();
        let mut tracker =
            EpochTracker::init(&integer, self.sampling_rate, self.lower_f0, self.upper_f0, self.unvoiced_cost())?;
        let polarity = tracker.compute_polarity()?;
        tracker.compute_features()?;
        tracker.track_epochs()?;
        let frames = tracker.resample(self.frame_shift, waveform.len().div_ceil(self.frame_shift))?;
        let epochs = tracker.voiced_epochs()?;
        Ok(PitchTrack { frames, epochs, polarity })
    }
}
