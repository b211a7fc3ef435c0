use super::{for_each_frame, open_input, open_output};
use anyhow::{bail, ensure, Context, Result};
use clap::Args;
use sptk::io::{read_vector, write_vector};
use sptk::statistics::{normalize_autocorrelation, Autocorrelation, MedianAccumulator};
use std::io::Write;
use std::path::PathBuf;
#[derive(Args, Debug)]
pub struct AcorrArgs {
    /// Frame length
    #[arg(short = 'l', default_value_t = 256)]
    pub frame_length: usize,
    /// Order of autocorrelation
    #[arg(short = 'm', default_value_t = 25)]
    pub num_order: usize,
    /// Output format (0 autocorrelation, 1 normalized autocorrelation)
    #[arg(short = 'o', default_value_t = 0)]
    pub output_format: u8,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn acorr(args: AcorrArgs) -> Result<()> {
    let normalize = match args.output_format {
        0 => false,
        1 => true,
        _ => bail!("The argument for the -o option must be 0 or 1"),
    };
    let kernel = Autocorrelation::new(args.frame_length, args.num_order);
    if !kernel.is_valid() {
        bail!("Failed to initialize Autocorrelation");
    }
    for_each_frame(args.infile.as_deref(), args.frame_length, |_, frame, out| {
        kernel.run(frame, out).context("Failed to compute autocorrelation")?;
        if normalize {
            normalize_autocorrelation(out).context("Failed to normalize autocorrelation")?;
        }
        Ok(())
    })
}
#[derive(Args, Debug)]
pub struct MedianArgs {
    /// Length of vector
    #[arg(short = 'l', default_value_t = 1)]
    pub vector_length: usize,
    /// Output interval, the whole stream when omitted
    #[arg(short = 't')]
    pub output_interval: Option<usize>,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
/// Feeds vectors to the accumulator and emits a median every `interval`
/// vectors, or once at the end of the stream. Incomplete trailing groups
/// are dropped.
pub fn stream_median<F>(
    vectors: impl IntoIterator<Item = Result<Vec<f64>>>,
    vector_length: usize,
    interval: Option<usize>,
    mut emit: F,
) -> Result<()>
where
    F: FnMut(&[f64]) -> Result<()>,
{
    let mut accumulator = MedianAccumulator::new(vector_length);
    for vector in vectors {
        accumulator.push(&vector?)?;
        if interval.is_some_and(|t| accumulator.len() == t) {
            emit(&accumulator.median()?)?;
            accumulator.clear();
        }
    }
    if interval.is_none() {
        ensure!(!accumulator.is_empty(), "Input stream is empty");
        emit(&accumulator.median()?)?;
    }
    Ok(())
}
pub fn median(args: MedianArgs) -> Result<()> {
    ensure!(args.vector_length > 0, "Length of vector must be a positive integer");
    ensure!(args.output_interval != Some(0), "Output interval must be a positive integer");
    let mut input = open_input(args.infile.as_deref())?;
    let mut output = open_output();
    let vectors = std::iter::from_fn(|| read_vector::<f64, _>(&mut input, args.vector_length, false).map_err(anyhow::Error::from).transpose());
    stream_median(vectors, args.vector_length, args.output_interval, |m| {
        write_vector(m, &mut output).context("Failed to write median")
    })?;
    output.flush()?;
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    fn ramp(n: usize) -> Vec<Result<Vec<f64>>> {
        (0..n).map(|i| Ok(vec![i as f64])).collect()
    }
    #[test]
    fn test_whole_stream_median() -> Result<()> {
        let mut medians = Vec::new();
        stream_median(ramp(6), 1, None, |m| {
            medians.push(m.to_vec());
            Ok(())
        })?;
        assert_eq!(medians, vec![vec![2.5]]);
        Ok(())
    }
    #[test]
    fn test_interval_median() -> Result<()> {
        let mut medians = Vec::new();
        stream_median(ramp(7), 1, Some(3), |m| {
            medians.push(m[0]);
            Ok(())
        })?;
        assert_eq!(medians, vec![1.0, 4.0]);
        Ok(())
    }
    #[test]
    fn test_empty_stream() {
        assert!(stream_median(Vec::new(), 2, None, |_| Ok(())).is_err());
        assert!(stream_median(Vec::new(), 2, Some(2), |_| Ok(())).is_ok());
    }
    #[test]
    fn test_vector_median() -> Result<()> {
        let vectors = vec![Ok(vec![1.0, 9.0]), Ok(vec![3.0, -1.0]), Ok(vec![2.0, 4.0])];
        let mut medians = Vec::new();
        stream_median(vectors, 2, None, |m| {
            medians.extend_from_slice(m);
            Ok(())
        })?;
        assert_eq!(medians, vec![2.0, 4.0]);
        Ok(())
    }
}
