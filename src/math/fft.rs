use crate::error::{check_length, Result, SptkError};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;
/// Fixed power-of-two length transform of real sequences, planned once.
#[derive(Clone)]
pub struct RealFft {
    fft_length: usize,
    plans: Option<(Arc<dyn Fft<f64>>, Arc<dyn Fft<f64>>)>,
}
#[derive(Debug, Default)]
pub struct RealFftBuffer {
    work: Vec<Complex64>,
    scratch: Vec<Complex64>,
}
impl fmt::Debug for RealFft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealFft").field("fft_length", &self.fft_length).finish()
    }
}
impl RealFft {
    pub fn new(fft_length: usize) -> Self {
        let plans = fft_length.is_power_of_two().then(|| {
            let mut planner = FftPlanner::<f64>::new();
            (planner.plan_fft_forward(fft_length), planner.plan_fft_inverse(fft_length))
        });
        Self { fft_length, plans }
    }
    pub fn is_valid(&self) -> bool {
        self.plans.is_some()
    }
    pub fn fft_length(&self) -> usize {
        self.fft_length
    }
    fn process(plan: &Arc<dyn Fft<f64>>, buffer: &mut RealFftBuffer) {
        buffer.scratch.resize(plan.get_inplace_scratch_len(), Complex64::new(0.0, 0.0));
        plan.process_with_scratch(&mut buffer.work, &mut buffer.scratch);
    }
    /// Writes the full `fft_length` spectrum of `input`, zero-padded, into `output`.
    pub fn run(&self, input: &[f64], output: &mut Vec<Complex64>, buffer: &mut RealFftBuffer) -> Result<()> {
        let Some((forward, _)) = &self.plans else {
            return Err(SptkError::NotInitialized("real fft"));
        };
        if input.len() > self.fft_length {
            return Err(SptkError::invalid(format!(
                "input length {} exceeds fft length {}",
                input.len(),
                self.fft_length
            )));
        }
        buffer.work.clear();
        buffer.work.extend(input.iter().map(|&x| Complex64::new(x, 0.0)));
        buffer.work.resize(self.fft_length, Complex64::new(0.0, 0.0));
        Self::process(forward, buffer);
        output.clear();
        output.extend_from_slice(&buffer.work);
        Ok(())
    }
    /// Real part of the inverse transform of a full spectrum, scaled by `1 / fft_length`.
    pub fn inverse(&self, spectrum: &[Complex64], output: &mut Vec<f64>, buffer: &mut RealFftBuffer) -> Result<()> {
        let Some((_, inverse)) = &self.plans else {
            return Err(SptkError::NotInitialized("real fft"));
        };
        check_length(self.fft_length, spectrum.len())?;
        buffer.work.clear();
        buffer.work.extend_from_slice(spectrum);
        Self::process(inverse, buffer);
        let scale = 1.0 / self.fft_length as f64;
        output.clear();
        output.extend(buffer.work.iter().map(|c| c.re * scale));
        Ok(())
    }
}
