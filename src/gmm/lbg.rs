use crate::error::{check_length, Result, SptkError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
/// Index of the nearest codebook vector.
pub fn quantize(vector: &[f64], codebook: &[Vec<f64>]) -> Option<usize> {
    codebook
        .iter()
        .map(|c| squared_distance(vector, c))
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
/// Linde-Buzo-Gray codebook design by repeated splitting and k-means.
#[derive(Debug, Clone)]
pub struct LindeBuzoGray {
    num_order: usize,
    initial_codebook_size: usize,
    target_codebook_size: usize,
    min_num_vector_in_cluster: usize,
    num_iteration: usize,
    convergence_threshold: f64,
    splitting_factor: f64,
    seed: u64,
    is_valid: bool,
}
impl LindeBuzoGray {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num_order: usize,
        initial_codebook_size: usize,
        target_codebook_size: usize,
        min_num_vector_in_cluster: usize,
        num_iteration: usize,
        convergence_threshold: f64,
        splitting_factor: f64,
        seed: u64,
    ) -> Self {
        let is_valid = initial_codebook_size >= 1
            && initial_codebook_size <= target_codebook_size
            && target_codebook_size.is_power_of_two()
            && initial_codebook_size.is_power_of_two()
            && min_num_vector_in_cluster >= 1
            && num_iteration >= 1
            && convergence_threshold >= 0.0
            && splitting_factor.is_finite();
        Self {
            num_order,
            initial_codebook_size,
            target_codebook_size,
            min_num_vector_in_cluster,
            num_iteration,
            convergence_threshold,
            splitting_factor,
            seed,
            is_valid,
        }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    /// Grows `codebook` from the initial to the target size and writes the
    /// final cluster index of every input vector.
    pub fn run(&self, input: &[Vec<f64>], codebook: &mut Vec<Vec<f64>>, indices: &mut Vec<usize>) -> Result<()> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("linde-buzo-gray"));
        }
        let dim = self.num_order + 1;
        if input.len() < self.min_num_vector_in_cluster * self.target_codebook_size {
            return Err(SptkError::invalid(format!(
                "{} vectors cannot fill {} clusters",
                input.len(),
                self.target_codebook_size
            )));
        }
        check_length(self.initial_codebook_size, codebook.len())?;
        for v in input.iter().chain(codebook.iter()) {
            check_length(dim, v.len())?;
        }
        let normal = Normal::new(0.0, 1.0).map_err(|e| SptkError::numeric(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut book = codebook.clone();
        let mut assignment = vec![0usize; input.len()];
        let mut sums = vec![vec![0.0; dim]; self.target_codebook_size];
        let mut counts = vec![0usize; self.target_codebook_size];
        let mut size = self.initial_codebook_size;
        while size * 2 <= self.target_codebook_size {
            for i in 0..size {
                let mut twin = book[i].clone();
                for (c, t) in book[i].iter_mut().zip(twin.iter_mut()) {
                    let perturbation = self.splitting_factor * normal.sample(&mut rng);
                    *t -= perturbation;
                    *c += perturbation;
                }
                book.push(twin);
            }
            size *= 2;
            let mut prev_distance = f64::MAX;
            for _ in 0..self.num_iteration {
                sums[..size].iter_mut().for_each(|s| s.iter_mut().for_each(|x| *x = 0.0));
                counts[..size].iter_mut().for_each(|c| *c = 0);
                let mut total_distance = 0.0;
                for (t, x) in input.iter().enumerate() {
                    let index = quantize(x, &book).ok_or(SptkError::EmptyInput)?;
                    assignment[t] = index;
                    counts[index] += 1;
                    sums[index].iter_mut().zip(x.iter()).for_each(|(s, v)| *s += v);
                    total_distance += squared_distance(x, &book[index]);
                }
                total_distance /= input.len() as f64;
                if total_distance == 0.0
                    || (prev_distance - total_distance).abs() / total_distance < self.convergence_threshold
                {
                    break;
                }
                prev_distance = total_distance;
                let mut majority = 0;
                for i in 0..size {
                    if counts[majority] < counts[i] {
                        majority = i;
                    }
                    if self.min_num_vector_in_cluster <= counts[i] {
                        let scale = 1.0 / counts[i] as f64;
                        book[i].iter_mut().zip(sums[i].iter()).for_each(|(c, s)| *c = s * scale);
                    }
                }
                // reseed starving clusters around the most populated one
                for i in 0..size {
                    if counts[i] < self.min_num_vector_in_cluster {
                        for m in 0..dim {
                            let perturbation = self.splitting_factor * normal.sample(&mut rng);
                            book[i][m] = book[majority][m] - perturbation;
                            book[majority][m] += perturbation;
                        }
                    }
                }
            }
        }
        for (t, x) in input.iter().enumerate() {
            assignment[t] = quantize(x, &book).ok_or(SptkError::EmptyInput)?;
        }
        *codebook = book;
        *indices = assignment;
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_splits_two_clusters() -> Result<()> {
        let input: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let center = if i % 2 == 0 { -5.0 } else { 5.0 };
                vec![center + 0.1 * ((i / 2) % 5) as f64 - 0.2, 1.0]
            })
            .collect();
        let mean: Vec<f64> = (0..2).map(|m| input.iter().map(|v| v[m]).sum::<f64>() / 40.0).collect();
        let mut codebook = vec![mean];
        let mut indices = Vec::new();
        LindeBuzoGray::new(1, 1, 2, 1, 1000, 1e-5, 1e-5, 1).run(&input, &mut codebook, &mut indices)?;
        assert_eq!(codebook.len(), 2);
        let mut centers: Vec<f64> = codebook.iter().map(|c| c[0]).collect();
        centers.sort_by(|a, b| a.total_cmp(b));
        assert!((centers[0] + 5.0).abs() < 1e-9 && (centers[1] - 5.0).abs() < 1e-9, "{:?}", centers);
        assert!(indices.iter().step_by(2).all(|&i| i == indices[0]));
        assert!(indices[0] != indices[1]);
        Ok(())
    }
    #[test]
    fn test_quantize_and_rejections() {
        let codebook = vec![vec![0.0], vec![10.0]];
        assert_eq!(quantize(&[6.0], &codebook), Some(1));
        assert_eq!(quantize(&[1.0], &[]), None);
        assert!(!LindeBuzoGray::new(0, 1, 3, 1, 10, 1e-5, 1e-5, 1).is_valid());
        let mut book = vec![vec![0.0]];
        let mut indices = Vec::new();
        let lbg = LindeBuzoGray::new(0, 1, 4, 1, 10, 1e-5, 1e-5, 1);
        assert!(lbg.run(&[vec![1.0], vec![2.0]], &mut book, &mut indices).is_err());
        assert_eq!(book, vec![vec![0.0]]);
    }
}
