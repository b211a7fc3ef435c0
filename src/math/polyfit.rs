use crate::error::{check_length, Result, SptkError};
/// Least-squares polynomial fit. Coefficients are returned highest power first.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    check_length(x.len(), y.len())?;
    let n = degree + 1;
    if x.len() < n {
        return Err(SptkError::invalid(format!(
            "{} points cannot determine a degree {} polynomial",
            x.len(),
            degree
        )));
    }
    let powers: Vec<Vec<f64>> = (0..n)
        .map(|i| x.iter().map(|&v| v.powi((degree - i) as i32)).collect())
        .collect();
    let mut a: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| powers[i].iter().zip(&powers[j]).map(|(p, q)| p * q).sum()).collect())
        .collect();
    let mut b: Vec<f64> = (0..n)
        .map(|i| powers[i].iter().zip(y).map(|(p, v)| p * v).sum())
        .collect();
    // Gaussian elimination with partial pivoting on the normal equations
    for k in 0..n {
        let pivot = (k..n)
            .max_by(|&i, &j| a[i][k].abs().total_cmp(&a[j][k].abs()))
            .unwrap_or(k);
        if a[pivot][k] == 0.0 {
            return Err(SptkError::numeric("polynomial fit is singular"));
        }
        a.swap(k, pivot);
        b.swap(k, pivot);
        for i in k + 1..n {
            let q = a[i][k] / a[k][k];
            for j in k..n {
                a[i][j] -= q * a[k][j];
            }
            b[i] -= q * b[k];
        }
    }
    let mut coefs = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| a[i][j] * coefs[j]).sum();
        coefs[i] = (b[i] - sum) / a[i][i];
    }
    Ok(coefs)
}
/// Evaluates coefficients ordered highest power first.
#[inline]
pub fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().fold(0.0, |acc, &c| acc * x + c)
}
