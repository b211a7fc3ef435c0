//! SWIPE' pitch estimator.
//!
//! The pitch strength of every candidate is the inner product between an
//! ERB-scaled loudness spectrum and a sawtooth-inspired kernel that only
//! keeps the first and prime harmonics. Several window sizes contribute to
//! each candidate, weighted by how well the window matches its period.
use super::{PitchExtractor, PitchFrame, PitchTrack, Polarity};
use crate::consts::{MAX_SAMPLING_RATE, MIN_SAMPLING_RATE};
use crate::error::{Result, SptkError};
use crate::math::polyfit::{polyfit, polyval};
use crate::utils::interp::CubicSpline;
use crate::utils::stft::stft_core;
use ndarray::{Array2, s};
use std::f64::consts::PI;
use std::ops::Range;
const ERB_STEP: f64 = 0.1;
// 1/96 and 1/768 octave, truncated as in the published SWIPE' code
const LOG2_CANDIDATE_STEP: f64 = 0.0104167;
const LOG2_REFINEMENT_STEP: f64 = 0.0013028;
const SPLINE_END_SLOPE: f64 = 2.0;
const SHORT_SCALE: f64 = 1.0 / 32768.0;
const STRENGTH_FLOOR: f64 = -32768.0;
fn hz_to_erb(hz: f64) -> f64 {
    21.4 * (1.0 + hz / 229.0).log10()
}
fn erb_to_hz(erb: f64) -> f64 {
    (10f64.powf(erb / 21.4) - 1.0) * 229.0
}
fn is_prime(n: usize) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}
/// First index whose value exceeds `key`, clamped to `[1, len]`.
fn bisect(values: &[f64], key: f64) -> usize {
    values.partition_point(|&v| v <= key).max(1).min(values.len())
}
/// Spline query on the segment ending at `hi`. The two curvature terms are
/// multiplied rather than summed, which keeps SWIPE' loudness close to
/// linear interpolation between bins.
fn splinv(x: &[f64], y: &[f64], y2: &[f64], val: f64, hi: usize) -> f64 {
    let lo = hi - 1;
    let h = x[hi] - x[lo];
    let a = (x[hi] - val) / h;
    let b = (val - x[lo]) / h;
    a * y[lo] + b * y[hi] + ((a * a * a - a) * y2[lo] * (b * b * b - b) * y2[hi]) * (h * h) / 6.0
}
/// Frequency axes shared by every window size.
struct Grid {
    candidates: Vec<f64>,
    distances: Vec<f64>,
    windows: Vec<usize>,
    erbs: Vec<f64>,
    harmonics: Vec<usize>,
}
#[derive(Debug, Clone)]
pub struct PitchExtractionBySwipe {
    frame_shift: usize,
    sampling_rate: f64,
    lower_f0: f64,
    upper_f0: f64,
    voicing_threshold: f64,
    is_valid: bool,
}
impl PitchExtractionBySwipe {
    pub fn new(frame_shift: usize, sampling_rate: f64, lower_f0: f64, upper_f0: f64, voicing_threshold: f64) -> Self {
        let is_valid = frame_shift > 0
            && MIN_SAMPLING_RATE < sampling_rate
            && sampling_rate < MAX_SAMPLING_RATE
            && 10.0 < lower_f0
            && lower_f0 < upper_f0
            && upper_f0 < 0.5 * sampling_rate
            && (0.2..=0.5).contains(&voicing_threshold)
            // peak refinement needs three neighbouring candidates
            && ((upper_f0.log2() - lower_f0.log2()) / LOG2_CANDIDATE_STEP).ceil() >= 3.0;
        Self { frame_shift, sampling_rate, lower_f0, upper_f0, voicing_threshold, is_valid }
    }
    fn grid(&self) -> Grid {
        let fs = self.sampling_rate;
        let nyquist16 = 8.0 * fs;
        let largest = (nyquist16 / self.lower_f0).log2();
        let num_windows = (largest - (nyquist16 / self.upper_f0).log2()).round() as usize + 1;
        let windows: Vec<usize> = (0..num_windows)
            .map(|i| 2f64.powf(largest.round() - i as f64) as usize)
            .collect();
        let log2_lower = self.lower_f0.log2();
        let num_candidates = ((self.upper_f0.log2() - log2_lower) / LOG2_CANDIDATE_STEP).ceil() as usize;
        let candidates: Vec<f64> = (0..num_candidates)
            .map(|i| 2f64.powf(log2_lower + i as f64 * LOG2_CANDIDATE_STEP))
            .collect();
        let offset = (nyquist16 / windows[0] as f64).log2();
        let distances = candidates.iter().map(|p| 1.0 + p.log2() - offset).collect();
        let erb_start = hz_to_erb(self.lower_f0 / 4.0);
        let num_erbs = ((hz_to_erb(0.5 * fs) - erb_start) / ERB_STEP).ceil() as usize;
        let erbs: Vec<f64> = (0..num_erbs).map(|i| erb_to_hz(erb_start + i as f64 * ERB_STEP)).collect();
        let highest = erbs.last().map_or(0.0, |f| (f / candidates[0] - 0.75).floor().max(0.0)) as usize;
        let harmonics = (1..=highest).filter(|&h| h == 1 || is_prime(h)).collect();
        Grid { candidates, distances, windows, erbs, harmonics }
    }
    fn strength(&self, signal: &[f64], grid: &Grid, num_frames: usize) -> Result<Array2<f64>> {
        let mut strength = Array2::zeros((grid.candidates.len(), num_frames));
        let d = &grid.distances;
        let last = grid.windows.len() - 1;
        for (n, &window) in grid.windows.iter().enumerate() {
            let lo = if n == 0 { 0 } else { bisect(d, n as f64) };
            let hi = if n == last { d.len() } else { bisect(d, n as f64 + 2.0) };
            if lo >= hi {
                continue;
            }
            let loudness = loudness(signal, &grid.erbs, self.sampling_rate, window)?;
            self.add_strength(&mut strength, &loudness, grid, lo..hi, n as f64 + 1.0, window);
        }
        Ok(strength)
    }
    /// Accumulates one window's contribution to the candidates in `rows`,
    /// interpolated from the window's hop onto the output frame grid.
    fn add_strength(
        &self,
        strength: &mut Array2<f64>,
        loudness: &Array2<f64>,
        grid: &Grid,
        rows: Range<usize>,
        center: f64,
        window: usize,
    ) {
        let mut kernels = Array2::zeros((rows.len(), grid.erbs.len()));
        for (i, r) in rows.clone().enumerate() {
            let kernel = strength_kernel(&grid.erbs, &grid.harmonics, grid.candidates[r]);
            kernels.row_mut(i).assign(&ndarray::ArrayView1::from(&kernel));
        }
        let local = kernels.dot(&loudness.t());
        let weights: Vec<f64> = grid.distances[rows.clone()].iter().map(|d| 1.0 - (d - center).abs()).collect();
        let dt = self.frame_shift as f64 / self.sampling_rate;
        let dtp = (window / 2) as f64 / self.sampling_rate;
        let last = local.ncols() - 1;
        let (mut t, mut tp, mut k) = (0.0, 0.0, 0usize);
        let mut target = strength.slice_mut(s![rows, ..]);
        for j in 0..target.ncols() {
            let mut td = t - tp;
            while td >= 0.0 {
                k += 1;
                tp += dtp;
                td -= dtp;
            }
            let k = k.min(last);
            for (i, mu) in weights.iter().enumerate() {
                let current = local[[i, k]];
                let previous = local[[i, k - 1]];
                target[[i, j]] += (current + td * (current - previous) / dtp) * mu;
            }
            t += dt;
        }
    }
    fn pick(&self, strength: &Array2<f64>, candidates: &[f64]) -> Result<Vec<PitchFrame>> {
        let n = candidates.len();
        let search = ((candidates[2].log2() - candidates[0].log2()) / LOG2_REFINEMENT_STEP + 1.0).round() as usize;
        let tc = 1.0 / candidates[1];
        let ntc: Vec<f64> = candidates[..3].iter().map(|p| ((1.0 / p) / tc - 1.0) * 2.0 * PI).collect();
        strength
            .columns()
            .into_iter()
            .map(|column| {
                let (maxi, maxv) = column
                    .iter()
                    .enumerate()
                    .fold((0, STRENGTH_FLOOR), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
                if maxv <= self.voicing_threshold {
                    return Ok(PitchFrame { correlation: Some(maxv), ..PitchFrame::unvoiced() });
                }
                if maxi == 0 || maxi == n - 1 {
                    return Ok(PitchFrame { f0: candidates[0], epoch: None, correlation: Some(maxv) });
                }
                let tc = 1.0 / candidates[maxi];
                let log2_pc = candidates[maxi - 1].log2();
                let coefs = polyfit(&ntc, &[column[maxi - 1], column[maxi], column[maxi + 1]], 2)?;
                let (best, _) = (0..search).fold((0, STRENGTH_FLOOR), |best, i| {
                    let period = 1.0 / 2f64.powf(i as f64 * LOG2_REFINEMENT_STEP + log2_pc);
                    let v = polyval(&coefs, (period / tc - 1.0) * 2.0 * PI);
                    if v > best.1 { (i, v) } else { best }
                });
                let f0 = 2f64.powf(log2_pc + best as f64 * LOG2_REFINEMENT_STEP);
                Ok(PitchFrame { f0, epoch: None, correlation: Some(maxv) })
            })
            .collect()
    }
}
/// Loudness at the ERB axis for every half-overlapped frame, one row per
/// frame, each row normalized to unit length.
fn loudness(signal: &[f64], erbs: &[f64], sampling_rate: f64, window: usize) -> Result<Array2<f64>> {
    let half = window / 2;
    let spectrum = stft_core(signal, window, half, half)?;
    let step = sampling_rate / window as f64;
    let freqs: Vec<f64> = (0..half).map(|i| i as f64 * step).collect();
    let mut loudness = Array2::zeros((spectrum.ncols(), erbs.len()));
    let mut magnitudes = Vec::with_capacity(half);
    for (t, column) in spectrum.columns().into_iter().enumerate() {
        magnitudes.clear();
        magnitudes.extend(column.iter().take(half).map(|x| x.norm()));
        let spline = CubicSpline::clamped(&freqs, &magnitudes, SPLINE_END_SLOPE, SPLINE_END_SLOPE);
        let y2 = spline.second_derivatives();
        let mut row = loudness.row_mut(t);
        for (l, &erb) in row.iter_mut().zip(erbs) {
            // past the last bin the final segment is extended
            let hi = bisect(&freqs, erb).min(half - 1);
            let v = splinv(&freqs, &magnitudes, y2, erb, hi).sqrt();
            *l = if v.is_nan() { 0.0 } else { v };
        }
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm != 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }
    Ok(loudness)
}
fn strength_kernel(erbs: &[f64], harmonics: &[usize], candidate: f64) -> Vec<f64> {
    let mut kernel = vec![0.0; erbs.len()];
    for &h in harmonics {
        for (k, &f) in kernel.iter_mut().zip(erbs.iter()) {
            let q = f / candidate;
            let distance = (q - h as f64).abs();
            if distance < 0.25 {
                *k = (2.0 * PI * q).cos();
            } else if distance < 0.75 {
                *k += (2.0 * PI * q).cos() / 2.0;
            }
        }
    }
    kernel.iter_mut().zip(erbs.iter()).for_each(|(k, f)| *k *= (1.0 / f).sqrt());
    let norm = kernel.iter().filter(|&&k| k > 0.0).map(|k| k * k).sum::<f64>().sqrt();
    if norm > 0.0 {
        kernel.iter_mut().for_each(|k| *k /= norm);
    }
    kernel
}
impl PitchExtractor for PitchExtractionBySwipe {
    fn is_valid(&self) -> bool {
        self.is_valid
    }
    fn extract(&self, waveform: &[f64]) -> Result<PitchTrack> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("swipe"));
        }
        if waveform.len() < self.frame_shift {
            return Ok(PitchTrack::default());
        }
        let signal: Vec<f64> = waveform.iter().map(|x| x * SHORT_SCALE).collect();
        let grid = self.grid();
        let num_frames = waveform.len().div_ceil(self.frame_shift);
        let strength = self.strength(&signal, &grid, num_frames)?;
        let frames = self.pick(&strength, &grid.candidates)?;
        Ok(PitchTrack { frames, epochs: Vec::new(), polarity: Polarity::Unknown })
    }
}
