/// Cubic spline through `(x, y)` with either natural or clamped ends.
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    y2: Vec<f64>,
}
impl CubicSpline {
    /// Natural spline: zero second derivative at both ends.
    pub fn natural(x: &[f64], y: &[f64]) -> Self {
        Self::build(x, y, None)
    }
    /// Spline with prescribed first derivatives at the ends.
    pub fn clamped(x: &[f64], y: &[f64], yp1: f64, ypn: f64) -> Self {
        Self::build(x, y, Some((yp1, ypn)))
    }
    fn build(x: &[f64], y: &[f64], slopes: Option<(f64, f64)>) -> Self {
        let n = x.len().min(y.len());
        let mut y2 = vec![0.0; n];
        if n >= 3 || (n == 2 && slopes.is_some()) {
            let mut u = vec![0.0; n];
            if let Some((yp1, _)) = slopes {
                let h = x[1] - x[0];
                y2[0] = -0.5;
                u[0] = (3.0 / h) * ((y[1] - y[0]) / h - yp1);
            }
            for i in 1..n - 1 {
                let sig = (x[i] - x[i - 1]) / (x[i + 1] - x[i - 1]);
                let p = sig * y2[i - 1] + 2.0;
                y2[i] = (sig - 1.0) / p;
                let d = (y[i + 1] - y[i]) / (x[i + 1] - x[i]) - (y[i] - y[i - 1]) / (x[i] - x[i - 1]);
                u[i] = (6.0 * d / (x[i + 1] - x[i - 1]) - sig * u[i - 1]) / p;
            }
            let (qn, un) = match slopes {
                Some((_, ypn)) => {
                    let h = x[n - 1] - x[n - 2];
                    (0.5, (3.0 / h) * (ypn - (y[n - 1] - y[n - 2]) / h))
                }
                None => (0.0, 0.0),
            };
            y2[n - 1] = (un - qn * u[n - 2]) / (qn * y2[n - 2] + 1.0);
            for k in (0..n - 1).rev() {
                y2[k] = y2[k] * y2[k + 1] + u[k];
            }
        }
        Self {
            x: x[..n].to_vec(),
            y: y[..n].to_vec(),
            y2,
        }
    }
    pub fn second_derivatives(&self) -> &[f64] {
        &self.y2
    }
    #[inline]
    fn eval_segment(&self, lo: usize, t: f64) -> f64 {
        let hi = lo + 1;
        let h = self.x[hi] - self.x[lo];
        let a = (self.x[hi] - t) / h;
        let b = (t - self.x[lo]) / h;
        a * self.y[lo]
            + b * self.y[hi]
            + ((a * a * a - a) * self.y2[lo] + (b * b * b - b) * self.y2[hi]) * (h * h) / 6.0
    }
    /// Evaluates at one point, extrapolating with the outermost segments.
    pub fn sample(&self, t: f64) -> f64 {
        match self.x.len() {
            0 => 0.0,
            1 => self.y[0],
            n => {
                let lo = self.x.partition_point(|&v| v <= t).saturating_sub(1).min(n - 2);
                self.eval_segment(lo, t)
            }
        }
    }
    /// Evaluates at ascending query points.
    #[inline(always)]
    pub fn sample_with_slice(&self, t_slice: &[f64]) -> Vec<f64> {
        let n = self.x.len();
        if n < 2 {
            return t_slice.iter().map(|&t| self.sample(t)).collect();
        }
        let mut result = Vec::with_capacity(t_slice.len());
        let mut i = 0;
        for &t in t_slice {
            while i < n - 2 && self.x[i + 1] <= t {
                i += 1;
            }
            result.push(self.eval_segment(i, t));
        }
        result
    }
}
#[cfg(test)]
mod tests {
    use super::CubicSpline;
    const Y: [f64; 6] = [1., 2., 4., 2., 3., 2.];
    fn default_x() -> Vec<f64> {
        (0..Y.len()).map(|i| i as f64).collect()
    }
    #[test]
    fn test_interpolates_knots() {
        let x = default_x();
        let spline = CubicSpline::natural(&x, &Y);
        let result = spline.sample_with_slice(&x);
        for (r, y) in result.iter().zip(Y.iter()) {
            assert!((r - y).abs() < 1e-12, "Knot mismatch: {} vs {}", r, y);
        }
        assert!((spline.sample(2.0) - 4.0).abs() < 1e-12);
    }
    #[test]
    fn test_reproduces_cubic_with_exact_slopes() {
        let f = |x: f64| x * x * x - 2.0 * x;
        let df = |x: f64| 3.0 * x * x - 2.0;
        let x: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&v| f(v)).collect();
        let spline = CubicSpline::clamped(&x, &y, df(0.0), df(3.5));
        for t in [0.25, 1.3, 2.9, 3.45] {
            assert!((spline.sample(t) - f(t)).abs() < 1e-9, "Cubic mismatch at {}", t);
        }
    }
    #[test]
    fn test_natural_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 2.0, 4.0, 6.0];
        let spline = CubicSpline::natural(&x, &y);
        let result = spline.sample_with_slice(&[0.5, 1.5, 2.5, 4.0]);
        for (r, e) in result.iter().zip([1.0, 3.0, 5.0, 8.0].iter()) {
            assert!((r - e).abs() < 1e-12, "Linear mismatch: {} vs {}", r, e);
        }
    }
}
