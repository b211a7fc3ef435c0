use crate::error::{check_length, Result, SptkError};
/// Short-time autocorrelation `r(m) = sum_n x(n) x(n + m)`, `m = 0..=M`.
#[derive(Debug, Clone)]
pub struct Autocorrelation {
    frame_length: usize,
    num_order: usize,
}
impl Autocorrelation {
    pub fn new(frame_length: usize, num_order: usize) -> Self {
        Self { frame_length, num_order }
    }
    pub fn is_valid(&self) -> bool {
        self.frame_length > 0
    }
    pub fn run(&self, frame: &[f64], autocorrelation: &mut Vec<f64>) -> Result<()> {
        if !self.is_valid() {
            return Err(SptkError::NotInitialized("autocorrelation"));
        }
        check_length(self.frame_length, frame.len())?;
        autocorrelation.clear();
        autocorrelation.extend((0..=self.num_order).map(|m| {
            frame.iter().zip(frame.iter().skip(m)).map(|(a, b)| a * b).sum::<f64>()
        }));
        Ok(())
    }
}
/// Divides the sequence by `r(0)`.
pub fn normalize_autocorrelation(autocorrelation: &mut [f64]) -> Result<()> {
    let r0 = autocorrelation.first().copied().ok_or(SptkError::EmptyInput)?;
    if r0 == 0.0 {
        return Err(SptkError::numeric("cannot normalize by zero power"));
    }
    autocorrelation.iter_mut().for_each(|r| *r /= r0);
    Ok(())
}
/// Median of `values`, averaging the two central values for even counts.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let half = values.len() / 2;
    Some(if values.len() % 2 == 0 { 0.5 * (values[half - 1] + values[half]) } else { values[half] })
}
/// Collects vectors of a fixed length and reports their element-wise median.
#[derive(Debug, Clone)]
pub struct MedianAccumulator {
    vector_length: usize,
    vectors: Vec<Vec<f64>>,
}
impl MedianAccumulator {
    pub fn new(vector_length: usize) -> Self {
        Self { vector_length, vectors: Vec::new() }
    }
    pub fn push(&mut self, vector: &[f64]) -> Result<()> {
        check_length(self.vector_length, vector.len())?;
        self.vectors.push(vector.to_vec());
        Ok(())
    }
    pub fn len(&self) -> usize {
        self.vectors.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
    pub fn clear(&mut self) {
        self.vectors.clear();
    }
    pub fn median(&self) -> Result<Vec<f64>> {
        let mut column = Vec::with_capacity(self.vectors.len());
        (0..self.vector_length)
            .map(|i| {
                column.clear();
                column.extend(self.vectors.iter().map(|v| v[i]));
                median(&mut column).ok_or(SptkError::EmptyInput)
            })
            .collect()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_impulse_autocorrelation() -> Result<()> {
        let mut r = Vec::new();
        Autocorrelation::new(4, 2).run(&[1.0, 0.0, 0.0, 0.0], &mut r)?;
        assert_eq!(r, vec![1.0, 0.0, 0.0]);
        Ok(())
    }
    #[test]
    fn test_autocorrelation_values() -> Result<()> {
        let mut r = Vec::new();
        Autocorrelation::new(3, 4).run(&[1.0, 2.0, 3.0], &mut r)?;
        assert_eq!(r, vec![14.0, 8.0, 3.0, 0.0, 0.0]);
        normalize_autocorrelation(&mut r)?;
        assert!((r[1] - 8.0 / 14.0).abs() < 1e-15);
        assert!(normalize_autocorrelation(&mut [0.0, 1.0]).is_err());
        assert!(Autocorrelation::new(3, 1).run(&[1.0], &mut r).is_err());
        Ok(())
    }
    #[test]
    fn test_median_of_ramp() -> Result<()> {
        let mut acc = MedianAccumulator::new(1);
        for i in 0..6 {
            acc.push(&[i as f64])?;
        }
        assert_eq!(acc.median()?, vec![2.5]);
        let mut outputs = Vec::new();
        acc.clear();
        for i in 0..6 {
            acc.push(&[i as f64])?;
            if acc.len() == 3 {
                outputs.extend(acc.median()?);
                acc.clear();
            }
        }
        assert_eq!(outputs, vec![1.0, 4.0]);
        Ok(())
    }
    #[test]
    fn test_elementwise_median() -> Result<()> {
        let mut acc = MedianAccumulator::new(2);
        acc.push(&[3.0, -1.0])?;
        acc.push(&[1.0, 5.0])?;
        acc.push(&[2.0, 0.0])?;
        assert_eq!(acc.median()?, vec![2.0, 0.0]);
        assert!(acc.push(&[1.0]).is_err());
        assert!(MedianAccumulator::new(1).median().is_err());
        Ok(())
    }
}
