use crate::error::{check_length, Result};
#[derive(Debug, Default)]
pub struct ParcorToLpcBuffer {
    k: Vec<f64>,
    a: Vec<f64>,
}
/// Forward Levinson recursion `a^i(m) = a^(i-1)(m) + k(i) a^(i-1)(i-m)`.
#[derive(Debug, Clone)]
pub struct ParcorToLpc {
    num_order: usize,
}
impl ParcorToLpc {
    pub fn new(num_order: usize) -> Self {
        Self { num_order }
    }
    pub fn is_valid(&self) -> bool {
        true
    }
    pub fn run(&self, parcor: &[f64], lpc: &mut Vec<f64>, buffer: &mut ParcorToLpcBuffer) -> Result<()> {
        let m = self.num_order;
        check_length(m + 1, parcor.len())?;
        buffer.k.clear();
        buffer.k.extend_from_slice(parcor);
        buffer.a.clear();
        buffer.a.resize(m + 1, 0.0);
        let (k, a) = (&mut buffer.k, &mut buffer.a);
        a[0] = parcor[0];
        for i in 1..=m {
            for j in 1..i {
                a[j] = k[j] + k[i] * k[i - j];
            }
            k[1..i].copy_from_slice(&a[1..i]);
        }
        if m > 0 {
            a[m] = k[m];
        }
        lpc.clear();
        lpc.extend_from_slice(a);
        Ok(())
    }
    pub fn run_in_place(&self, input_and_output: &mut Vec<f64>, buffer: &mut ParcorToLpcBuffer) -> Result<()> {
        let input = input_and_output.clone();
        self.run(&input, input_and_output, buffer)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_second_order() -> Result<()> {
        let mut lpc = Vec::new();
        ParcorToLpc::new(2).run(&[2.0, 0.4, 0.5], &mut lpc, &mut ParcorToLpcBuffer::default())?;
        assert_eq!(lpc[0], 2.0);
        assert!((lpc[1] - 0.6).abs() < 1e-15);
        assert_eq!(lpc[2], 0.5);
        Ok(())
    }
    #[test]
    fn test_zero_order_and_in_place() -> Result<()> {
        let mut v = vec![3.0];
        ParcorToLpc::new(0).run_in_place(&mut v, &mut ParcorToLpcBuffer::default())?;
        assert_eq!(v, vec![3.0]);
        let mut v = vec![1.0, 0.5];
        ParcorToLpc::new(1).run_in_place(&mut v, &mut ParcorToLpcBuffer::default())?;
        assert_eq!(v, vec![1.0, 0.5]);
        assert!(ParcorToLpc::new(2).run_in_place(&mut v, &mut ParcorToLpcBuffer::default()).is_err());
        Ok(())
    }
}
