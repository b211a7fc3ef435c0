use crate::error::{check_length, Result, SptkError};
#[derive(Debug, Default)]
pub struct LpcToLspBuffer {
    c1: Vec<f64>,
    c2: Vec<f64>,
    lsp: Vec<f64>,
}
/// LPC to LSP conversion by Chebyshev root search on the unit circle.
///
/// Input is `[K, a(1), ..., a(M)]`, output `[K, w(1), ..., w(M)]` with the
/// frequencies in radians, strictly increasing in `(0, pi)`.
#[derive(Debug, Clone)]
pub struct LpcToLsp {
    num_order: usize,
    num_split: usize,
    num_iteration: usize,
    convergence_threshold: f64,
    is_valid: bool,
}
/// Clenshaw evaluation of `sum_i c[i] T_i(x)`.
fn chebyshev(c: &[f64], x: f64) -> f64 {
    let mut b1 = 0.0;
    let mut b2 = 0.0;
    for &ci in c.iter().skip(1).rev() {
        let b0 = 2.0 * x * b1 - b2 + ci;
        b2 = b1;
        b1 = b0;
    }
    x * b1 - b2 + c[0]
}
impl LpcToLsp {
    pub fn new(num_order: usize, num_split: usize, num_iteration: usize, convergence_threshold: f64) -> Self {
        let is_valid = num_split > 0 && num_iteration > 0 && convergence_threshold >= 0.0;
        Self { num_order, num_split, num_iteration, convergence_threshold, is_valid }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    pub fn num_order(&self) -> usize {
        self.num_order
    }
    fn build_polynomials(&self, a: &[f64], buffer: &mut LpcToLspBuffer) {
        let m = self.num_order;
        let sym = m.div_ceil(2);
        let asym = m / 2;
        buffer.c1.clear();
        buffer.c1.resize(sym + 1, 0.0);
        buffer.c2.clear();
        buffer.c2.resize(asym + 1, 0.0);
        let (c1, c2) = (&mut buffer.c1, &mut buffer.c2);
        c1[sym] = 1.0;
        c2[asym] = 1.0;
        let (mut p1, mut p2) = (1, m);
        if m % 2 == 0 {
            for i in (0..sym).rev() {
                c1[i] = a[p1] + a[p2] - c1[i + 1];
                c2[i] = a[p1] - a[p2] + c2[i + 1];
                p1 += 1;
                p2 -= 1;
            }
        } else {
            for i in (0..asym).rev() {
                c1[i + 1] = a[p1] + a[p2];
                c2[i] = if i == asym - 1 { a[p1] - a[p2] } else { a[p1] - a[p2] + c2[i + 2] };
                p1 += 1;
                p2 -= 1;
            }
            c1[0] = a[p1] + a[p2];
        }
        c1[0] *= 0.5;
        c2[0] *= 0.5;
    }
    pub fn run(&self, lpc: &[f64], lsp: &mut Vec<f64>, buffer: &mut LpcToLspBuffer) -> Result<()> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("lpc to lsp"));
        }
        let m = self.num_order;
        check_length(m + 1, lpc.len())?;
        if m == 0 {
            *lsp = vec![lpc[0]];
            return Ok(());
        }
        self.build_polynomials(lpc, buffer);
        buffer.lsp.clear();
        buffer.lsp.push(lpc[0]);
        let mut use_symmetric = true;
        let poly = |sym: bool, buffer: &LpcToLspBuffer, x: f64| {
            if sym { chebyshev(&buffer.c1, x) } else { chebyshev(&buffer.c2, x) }
        };
        let delta = 1.0 / self.num_split as f64;
        let x_min = -1.0 - delta;
        let mut x_prev = 1.0;
        let mut y_prev = poly(use_symmetric, buffer, x_prev);
        let mut x = 1.0 - delta;
        while x_min < x {
            let mut y = poly(use_symmetric, buffer, x);
            if y * y_prev <= 0.0 {
                let (mut x_lower, mut x_upper) = (x, x_prev);
                let (mut y_lower, mut y_upper) = (y, y_prev);
                for _ in 0..self.num_iteration {
                    let x_mid = 0.5 * (x_lower + x_upper);
                    let y_mid = poly(use_symmetric, buffer, x_mid);
                    if y_mid * y_upper <= 0.0 {
                        x_lower = x_mid;
                        y_lower = y_mid;
                    } else {
                        x_upper = x_mid;
                        y_upper = y_mid;
                    }
                    if y_mid.abs() <= self.convergence_threshold {
                        break;
                    }
                }
                let x_interpolated = if y_lower == y_upper {
                    0.5 * (x_lower + x_upper)
                } else {
                    (y_lower * x_upper - y_upper * x_lower) / (y_lower - y_upper)
                };
                buffer.lsp.push(x_interpolated.clamp(-1.0, 1.0).acos());
                if buffer.lsp.len() == m + 1 {
                    lsp.clear();
                    lsp.extend_from_slice(&buffer.lsp);
                    return Ok(());
                }
                use_symmetric = !use_symmetric;
                x = x_interpolated;
                y = poly(use_symmetric, buffer, x);
            }
            x_prev = x;
            y_prev = y;
            x -= delta;
        }
        Err(SptkError::numeric(format!(
            "root search did not converge: found {} of {} line spectral pairs",
            buffer.lsp.len() - 1,
            m
        )))
    }
    pub fn run_in_place(&self, input_and_output: &mut Vec<f64>, buffer: &mut LpcToLspBuffer) -> Result<()> {
        let input = input_and_output.clone();
        self.run(&input, input_and_output, buffer)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::lsp_to_lpc::{LspToLpc, LspToLpcBuffer};
    use std::f64::consts::PI;
    #[test]
    fn test_round_trip_second_order() -> Result<()> {
        let lpc = vec![1.0, -1.5, 0.7];
        let to_lsp = LpcToLsp::new(2, 64, 4, 1e-6);
        let mut lsp = Vec::new();
        to_lsp.run(&lpc, &mut lsp, &mut LpcToLspBuffer::default())?;
        assert_eq!(lsp[0], 1.0);
        assert!(lsp[1] > 0.0 && lsp[1] < lsp[2] && lsp[2] < PI, "lsp = {:?}", lsp);
        let mut restored = Vec::new();
        LspToLpc::new(2).run(&lsp, &mut restored, &mut LspToLpcBuffer::default())?;
        let err = lpc.iter().zip(restored.iter()).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max);
        assert!(err < 1e-6, "round trip error {}", err);
        Ok(())
    }
    #[test]
    fn test_round_trip_odd_order() -> Result<()> {
        // poles at 0.9 and 0.6 e^{+-j0.8}
        let (r, th) = (0.6f64, 0.8f64);
        let lpc = vec![
            0.5,
            -0.9 - 2.0 * r * th.cos(),
            r * r + 1.8 * r * th.cos(),
            -0.9 * r * r,
        ];
        let mut lsp = Vec::new();
        LpcToLsp::new(3, 256, 8, 1e-10).run(&lpc, &mut lsp, &mut LpcToLspBuffer::default())?;
        assert!(lsp.windows(2).skip(1).all(|w| w[0] < w[1]), "not increasing: {:?}", lsp);
        let mut restored = Vec::new();
        LspToLpc::new(3).run(&lsp, &mut restored, &mut LspToLpcBuffer::default())?;
        assert_eq!(restored[0], 0.5);
        for (a, b) in lpc.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
        Ok(())
    }
    #[test]
    fn test_zero_order_and_errors() -> Result<()> {
        let mut out = vec![3.0];
        LpcToLsp::new(0, 64, 4, 1e-6).run(&[2.0], &mut out, &mut LpcToLspBuffer::default())?;
        assert_eq!(out, vec![2.0]);
        assert!(LpcToLsp::new(2, 64, 4, 1e-6).run(&[1.0], &mut out, &mut LpcToLspBuffer::default()).is_err());
        assert!(!LpcToLsp::new(2, 0, 4, 1e-6).is_valid());
        // unstable filter: roots off the unit circle break the interlacing
        let mut lsp = vec![7.0];
        let result = LpcToLsp::new(2, 64, 4, 1e-6).run(&[1.0, 0.0, 4.0], &mut lsp, &mut LpcToLspBuffer::default());
        assert!(result.is_err());
        assert_eq!(lsp, vec![7.0]);
        Ok(())
    }
    #[test]
    fn test_in_place() -> Result<()> {
        let mut v = vec![1.0, -1.5, 0.7];
        LpcToLsp::new(2, 64, 4, 1e-6).run_in_place(&mut v, &mut LpcToLspBuffer::default())?;
        assert_eq!(v.len(), 3);
        assert!(v[1] < v[2]);
        Ok(())
    }
}
