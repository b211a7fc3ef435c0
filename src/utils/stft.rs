use crate::error::{Result, SptkError};
use crate::math::fft::{RealFft, RealFftBuffer};
use ndarray::{Array2, ArrayView1, s};
use num_complex::Complex64;
use std::f64::consts::PI;
/// Periodic Hann window.
pub fn hann_window(length: usize) -> Vec<f64> {
    (0..length)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / length as f64).cos())
        .collect()
}
/// Hann-windowed STFT of `signal` preceded by `pad_left` zeros.
///
/// Frame `i` covers padded samples `i * hop_size .. i * hop_size + fft_size`;
/// samples past the end are zero. The result has `fft_size / 2 + 1` rows
/// and `ceil((len + pad_left) / hop_size)` columns.
pub fn stft_core(
    signal: &[f64],
    fft_size: usize,
    hop_size: usize,
    pad_left: usize,
) -> Result<Array2<Complex64>> {
    if hop_size == 0 {
        return Err(SptkError::invalid("hop size must be positive"));
    }
    let fft = RealFft::new(fft_size);
    if !fft.is_valid() {
        return Err(SptkError::invalid(format!("fft size {} is not a power of two", fft_size)));
    }
    let freq_bins = fft_size / 2 + 1;
    let padded_len = signal.len() + pad_left;
    let n_frames = padded_len.div_ceil(hop_size);
    let window = hann_window(fft_size);
    let mut complex_spec = Array2::from_elem((freq_bins, n_frames), Complex64::new(0.0, 0.0));
    let mut frame = vec![0.0; fft_size];
    let mut spectrum = Vec::with_capacity(fft_size);
    let mut buffer = RealFftBuffer::default();
    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_size;
        for (j, value) in frame.iter_mut().enumerate() {
            let pos = start + j;
            *value = if pos >= pad_left && pos - pad_left < signal.len() {
                signal[pos - pad_left] * window[j]
            } else {
                0.0
            };
        }
        fft.run(&frame, &mut spectrum, &mut buffer)?;
        complex_spec
            .slice_mut(s![.., frame_idx])
            .assign(&ArrayView1::from(&spectrum[..freq_bins]));
    }
    Ok(complex_spec)
}
