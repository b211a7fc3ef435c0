use crate::error::{check_length, Result, SptkError};
#[derive(Debug, Default)]
pub struct LspToLpcBuffer {
    p: Vec<f64>,
    q: Vec<f64>,
    a0: Vec<f64>,
    a1: Vec<f64>,
    a2: Vec<f64>,
    b0: Vec<f64>,
    b1: Vec<f64>,
    b2: Vec<f64>,
    lpc: Vec<f64>,
}
fn reset(v: &mut Vec<f64>, len: usize) {
    v.clear();
    v.resize(len, 0.0);
}
/// LSP to LPC conversion through the impulse response of the second-order
/// sections `1 - 2 cos(w) z^-1 + z^-2`. The gain is copied unchanged.
#[derive(Debug, Clone)]
pub struct LspToLpc {
    num_order: usize,
}
impl LspToLpc {
    pub fn new(num_order: usize) -> Self {
        Self { num_order }
    }
    pub fn is_valid(&self) -> bool {
        true
    }
    pub fn num_order(&self) -> usize {
        self.num_order
    }
    pub fn run(&self, lsp: &[f64], lpc: &mut Vec<f64>, buffer: &mut LspToLpcBuffer) -> Result<()> {
        let m = self.num_order;
        check_length(m + 1, lsp.len())?;
        if lsp.iter().any(|x| !x.is_finite()) {
            return Err(SptkError::numeric("line spectral pairs must be finite"));
        }
        if m == 0 {
            *lpc = vec![lsp[0]];
            return Ok(());
        }
        let sym = m.div_ceil(2);
        let asym = m / 2;
        reset(&mut buffer.p, asym);
        reset(&mut buffer.q, sym);
        reset(&mut buffer.a0, asym + 1);
        reset(&mut buffer.a1, asym);
        reset(&mut buffer.a2, asym);
        reset(&mut buffer.b0, sym + 1);
        reset(&mut buffer.b1, sym);
        reset(&mut buffer.b2, sym);
        reset(&mut buffer.lpc, m + 1);
        let LspToLpcBuffer { p, q, a0, a1, a2, b0, b1, b2, lpc: a } = buffer;
        for (i, pi) in p.iter_mut().enumerate() {
            *pi = -2.0 * lsp[2 * i + 2].cos();
        }
        for (i, qi) in q.iter_mut().enumerate() {
            *qi = -2.0 * lsp[2 * i + 1].cos();
        }
        a[0] = lsp[0];
        let is_even = m % 2 == 0;
        let (mut c0, mut c1, mut c2) = (1.0, 0.0, 0.0);
        for n in 0..=m {
            if is_even {
                a0[0] = c0 - c1;
                b0[0] = c0 + c1;
                c1 = c0;
            } else {
                a0[0] = c0 - c2;
                b0[0] = c0;
                c2 = c1;
                c1 = c0;
            }
            for i in 0..asym {
                a0[i + 1] = a0[i] + p[i] * a1[i] + a2[i];
                a2[i] = a1[i];
                a1[i] = a0[i];
            }
            for i in 0..sym {
                b0[i + 1] = b0[i] + q[i] * b1[i] + b2[i];
                b2[i] = b1[i];
                b1[i] = b0[i];
            }
            if n == 0 {
                c0 = 0.0;
            } else {
                a[n] = 0.5 * (a0[asym] + b0[sym]);
            }
        }
        lpc.clear();
        lpc.extend_from_slice(a);
        Ok(())
    }
    pub fn run_in_place(&self, input_and_output: &mut Vec<f64>, buffer: &mut LspToLpcBuffer) -> Result<()> {
        let input = input_and_output.clone();
        self.run(&input, input_and_output, buffer)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_first_order() -> Result<()> {
        // A(z) = 1 + a z^-1 has a single lsp at acos(-a)
        let a = -0.5f64;
        let mut lpc = Vec::new();
        LspToLpc::new(1).run(&[2.0, (-a).acos()], &mut lpc, &mut LspToLpcBuffer::default())?;
        assert_eq!(lpc[0], 2.0);
        assert!((lpc[1] - a).abs() < 1e-12, "a = {}", lpc[1]);
        Ok(())
    }
    #[test]
    fn test_evenly_spaced_lsp_is_trivial_filter() -> Result<()> {
        // w(m) = m pi / (M + 1) gives A(z) = 1
        let m = 4;
        let mut lsp = vec![1.0];
        lsp.extend((1..=m).map(|i| i as f64 * std::f64::consts::PI / (m + 1) as f64));
        let mut lpc = Vec::new();
        LspToLpc::new(m).run(&lsp, &mut lpc, &mut LspToLpcBuffer::default())?;
        assert!(lpc[1..].iter().all(|x| x.abs() < 1e-12), "lpc = {:?}", lpc);
        Ok(())
    }
    #[test]
    fn test_shape_mismatch_keeps_output() {
        let mut lpc = vec![5.0];
        assert!(LspToLpc::new(2).run(&[1.0, 0.5], &mut lpc, &mut LspToLpcBuffer::default()).is_err());
        assert_eq!(lpc, vec![5.0]);
    }
}
