//! Gaussian mixture modeling with EM or MAP reestimation.
pub mod lbg;
use crate::consts::LOG_TWO_PI;
use crate::error::{check_length, Result, SptkError};
use crate::io::{read_scalar, read_symmetric_matrix, read_vector, write_scalar, write_symmetric_matrix, write_vector};
use crate::math::symmetric_matrix::{invert_from_factors, SymmetricMatrix};
use crate::utils::log_sum_exp;
use lbg::LindeBuzoGray;
use ndarray::Array2;
use std::io::{Read, Write};
use tracing::info;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CovarianceType {
    Diagonal,
    Full,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializationType {
    /// The caller supplies the initial parameters.
    None,
    KMeans,
    Ubm,
}
/// Mixture weights, mean vectors and covariance matrices of a GMM.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GmmParameters {
    pub weights: Vec<f64>,
    pub means: Vec<Vec<f64>>,
    pub covariances: Vec<SymmetricMatrix>,
}
impl GmmParameters {
    pub fn num_mixture(&self) -> usize {
        self.weights.len()
    }
    pub fn check(&self, num_mixture: usize, dim: usize) -> Result<()> {
        check_length(num_mixture, self.weights.len())?;
        check_length(num_mixture, self.means.len())?;
        check_length(num_mixture, self.covariances.len())?;
        for (mean, cov) in self.means.iter().zip(self.covariances.iter()) {
            check_length(dim, mean.len())?;
            check_length(dim, cov.dim())?;
        }
        Ok(())
    }
    /// Reads `num_mixture` records of `w, mu, (variances | lower triangle)`.
    pub fn read<R: Read + ?Sized>(reader: &mut R, num_mixture: usize, dim: usize, is_diagonal: bool) -> Result<Self> {
        let truncated = || SptkError::invalid("model stream ended early");
        let mut params = GmmParameters::default();
        for _ in 0..num_mixture {
            params.weights.push(read_scalar::<f64, R>(reader)?.ok_or_else(truncated)?);
            params.means.push(read_vector::<f64, R>(reader, dim, false)?.ok_or_else(truncated)?);
            let cov = if is_diagonal {
                let variances = read_vector::<f64, R>(reader, dim, false)?.ok_or_else(truncated)?;
                let mut cov = SymmetricMatrix::new(dim);
                variances.iter().enumerate().for_each(|(l, v)| cov[(l, l)] = *v);
                cov
            } else {
                read_symmetric_matrix(reader, dim)?.ok_or_else(truncated)?
            };
            params.covariances.push(cov);
        }
        Ok(params)
    }
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W, is_diagonal: bool) -> Result<()> {
        for ((w, mean), cov) in self.weights.iter().zip(self.means.iter()).zip(self.covariances.iter()) {
            write_scalar(*w, writer)?;
            write_vector(mean, writer)?;
            if is_diagonal {
                write_vector(&cov.diagonal(), writer)?;
            } else {
                write_symmetric_matrix(cov, writer)?;
            }
        }
        Ok(())
    }
}
/// Precomputed normalizers and precisions shared across evaluations of
/// one model. Call [`GmmBuffer::invalidate`] whenever the model changes.
#[derive(Debug, Default)]
pub struct GmmBuffer {
    precomputed: bool,
    gconsts: Vec<f64>,
    precisions: Vec<SymmetricMatrix>,
    diff: Vec<f64>,
}
impl GmmBuffer {
    pub fn invalidate(&mut self) {
        self.precomputed = false;
    }
    fn precompute(&mut self, params: &GmmParameters, is_diagonal: bool) -> Result<()> {
        let dim = params.means.first().map_or(0, |m| m.len());
        self.gconsts.clear();
        self.precisions.clear();
        for cov in &params.covariances {
            // D log(2 pi) + log|S|, the -0.5 is applied later
            let log_determinant = if is_diagonal {
                let diagonal = cov.diagonal();
                if diagonal.iter().any(|v| *v <= 0.0) {
                    return Err(SptkError::numeric("variance must be positive"));
                }
                diagonal.iter().map(|v| v.ln()).sum()
            } else {
                let (l, d) = cov.cholesky_decomposition()?;
                self.precisions.push(invert_from_factors(&l, &d)?);
                d.iter().map(|x| x.ln()).sum::<f64>()
            };
            self.gconsts.push(dim as f64 * LOG_TWO_PI + log_determinant);
        }
        self.precomputed = true;
        Ok(())
    }
}
/// Returns `log p(x)` under the mixture and optionally the per-component
/// terms `log w_k + log N(x; mu_k, S_k)`.
pub fn calculate_log_probability(
    input: &[f64],
    params: &GmmParameters,
    is_diagonal: bool,
    components: Option<&mut Vec<f64>>,
    buffer: &mut GmmBuffer,
) -> Result<f64> {
    let dim = input.len();
    params.check(params.num_mixture(), dim)?;
    if !buffer.precomputed {
        buffer.precompute(params, is_diagonal)?;
    }
    let mut terms = Vec::with_capacity(params.num_mixture());
    for k in 0..params.num_mixture() {
        let mean = &params.means[k];
        let mut sum = buffer.gconsts[k];
        if is_diagonal {
            let cov = &params.covariances[k];
            for l in 0..dim {
                let diff = input[l] - mean[l];
                sum += diff * diff / cov[(l, l)];
            }
        } else {
            buffer.diff.clear();
            buffer.diff.extend(input.iter().zip(mean.iter()).map(|(x, m)| x - m));
            let precision = &buffer.precisions[k];
            for l in 0..dim {
                let row: f64 = (0..dim).map(|m| buffer.diff[m] * precision[(l, m)]).sum();
                sum += row * buffer.diff[l];
            }
        }
        terms.push(params.weights[k].ln() - 0.5 * sum);
    }
    let total = log_sum_exp(&terms);
    if let Some(out) = components {
        *out = terms;
    }
    Ok(total)
}
/// Training configuration. The defaults match the command line tool.
#[derive(Debug, Clone)]
pub struct GmmConfig {
    pub num_order: usize,
    pub num_mixture: usize,
    pub num_iteration: usize,
    pub convergence_threshold: f64,
    pub covariance_type: CovarianceType,
    /// Sizes of the covariance blocks, summing to `num_order + 1`.
    /// Empty means a single block.
    pub block_size: Vec<usize>,
    pub weight_floor: f64,
    pub variance_floor: f64,
    pub initialization_type: InitializationType,
    /// Progress is logged every this many iterations, never when `None`.
    pub log_interval: Option<usize>,
    /// MAP smoothing parameter in `[0, 1]`, zero for maximum likelihood.
    pub smoothing_parameter: f64,
}
impl Default for GmmConfig {
    fn default() -> Self {
        Self {
            num_order: 25,
            num_mixture: 16,
            num_iteration: 20,
            convergence_threshold: 1e-5,
            covariance_type: CovarianceType::Diagonal,
            block_size: Vec::new(),
            weight_floor: 1e-5,
            variance_floor: 1e-6,
            initialization_type: InitializationType::KMeans,
            log_interval: None,
            smoothing_parameter: 0.0,
        }
    }
}
#[derive(Debug, Clone)]
pub struct GaussianMixtureModeling {
    config: GmmConfig,
    ubm: Option<GmmParameters>,
    xi: Vec<f64>,
    mask: Array2<bool>,
    is_diagonal: bool,
    is_valid: bool,
}
/// Which `(l, m)` covariance entries are free parameters.
fn covariance_mask(covariance_type: CovarianceType, block_size: &[usize], dim: usize) -> Array2<bool> {
    let mut offsets = vec![0];
    block_size.iter().for_each(|b| offsets.push(offsets[offsets.len() - 1] + b));
    let mut mask = Array2::from_elem((dim, dim), true);
    for row in 0..block_size.len() {
        for col in 0..block_size.len() {
            for l in offsets[row]..offsets[row + 1] {
                for m in offsets[col]..offsets[col + 1] {
                    mask[[l, m]] = match covariance_type {
                        CovarianceType::Diagonal => {
                            block_size[row] == block_size[col] && offsets[row + 1] - l == offsets[col + 1] - m
                        }
                        CovarianceType::Full => row == col,
                    };
                }
            }
        }
    }
    mask
}
impl GaussianMixtureModeling {
    pub fn new(config: GmmConfig, ubm: Option<GmmParameters>) -> Self {
        let dim = config.num_order + 1;
        let block_size = if config.block_size.is_empty() { vec![dim] } else { config.block_size.clone() };
        let k = config.num_mixture;
        let mut is_valid = k > 0
            && (config.initialization_type != InitializationType::KMeans || k.is_power_of_two())
            && config.num_iteration > 0
            && config.convergence_threshold >= 0.0
            && config.weight_floor >= 0.0
            && config.weight_floor <= 1.0 / k.max(1) as f64
            && config.variance_floor >= 0.0
            && config.log_interval != Some(0)
            && (0.0..=1.0).contains(&config.smoothing_parameter)
            && block_size.iter().all(|b| *b > 0)
            && block_size.iter().sum::<usize>() == dim;
        let needs_ubm = config.initialization_type == InitializationType::Ubm || config.smoothing_parameter > 0.0;
        if needs_ubm {
            is_valid &= ubm.as_ref().is_some_and(|u| u.check(k, dim).is_ok());
        }
        let xi = match (&ubm, config.smoothing_parameter > 0.0) {
            (Some(u), true) => u.weights.iter().map(|w| config.smoothing_parameter * w).collect(),
            _ => Vec::new(),
        };
        let mask = if is_valid { covariance_mask(config.covariance_type, &block_size, dim) } else { Array2::from_elem((0, 0), false) };
        let is_diagonal = config.covariance_type == CovarianceType::Diagonal && block_size.len() == 1;
        Self { config: GmmConfig { block_size, ..config }, ubm, xi, mask, is_diagonal, is_valid }
    }
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
    /// True for a single diagonal block, the only case stored as variances.
    pub fn is_diagonal(&self) -> bool {
        self.is_diagonal
    }
    fn dim(&self) -> usize {
        self.config.num_order + 1
    }
    /// Lower-triangle entries `(l, m)` that are estimated.
    fn free_entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let dim = self.dim();
        let diagonal = self.is_diagonal;
        (0..dim)
            .flat_map(move |l| (if diagonal { l } else { 0 }..=l).map(move |m| (l, m)))
            .filter(|&(l, m)| self.mask[[l, m]])
    }
    fn floor_weight(&self, weights: &mut [f64]) {
        let floor = self.config.weight_floor;
        weights.iter_mut().for_each(|w| *w = w.max(floor));
        let sum: f64 = weights.iter().sum();
        if sum != 1.0 {
            let sum_floor = floor * weights.len() as f64;
            let a = (1.0 - sum_floor) / (sum - sum_floor);
            let b = floor * (1.0 - a);
            weights.iter_mut().for_each(|w| *w = a * *w + b);
        }
    }
    fn floor_variance(&self, covariances: &mut [SymmetricMatrix]) {
        let dim = self.dim();
        for cov in covariances.iter_mut() {
            for l in 0..dim {
                if cov[(l, l)] < self.config.variance_floor {
                    cov[(l, l)] = self.config.variance_floor;
                }
                for m in 0..l {
                    if !self.mask[[l, m]] {
                        cov[(l, m)] = 0.0;
                    }
                }
            }
        }
    }
    fn initialize(&self, input: &[Vec<f64>]) -> Result<GmmParameters> {
        let dim = self.dim();
        let k = self.config.num_mixture;
        let t = input.len() as f64;
        let mean: Vec<f64> = (0..dim).map(|l| input.iter().map(|x| x[l]).sum::<f64>() / t).collect();
        let mut means = vec![mean];
        let mut indices = vec![0; input.len()];
        if k >= 2 {
            LindeBuzoGray::new(self.config.num_order, 1, k, 1, 1000, 1e-5, 1e-5, 1).run(input, &mut means, &mut indices)?;
        }
        let mut counts = vec![0usize; k];
        indices.iter().for_each(|&i| counts[i] += 1);
        let mut weights: Vec<f64> = counts.iter().map(|&n| n as f64 / t).collect();
        self.floor_weight(&mut weights);
        let mut covariances = vec![SymmetricMatrix::new(dim); k];
        for (x, &i) in input.iter().zip(indices.iter()) {
            for (l, m) in self.free_entries() {
                covariances[i][(l, m)] += (x[l] - means[i][l]) * (x[m] - means[i][m]);
            }
        }
        for (cov, &n) in covariances.iter_mut().zip(counts.iter()) {
            if n > 0 {
                for (l, m) in self.free_entries() {
                    cov[(l, m)] /= n as f64;
                }
            }
        }
        self.floor_variance(&mut covariances);
        Ok(GmmParameters { weights, means, covariances })
    }
    /// Trains on `input`, starting from `params` when the initialization is
    /// `None`. Returns the final average log-likelihood. `params` is left
    /// untouched on failure.
    pub fn run(&self, input: &[Vec<f64>], params: &mut GmmParameters) -> Result<f64> {
        if !self.is_valid {
            return Err(SptkError::NotInitialized("gaussian mixture modeling"));
        }
        if input.is_empty() {
            return Err(SptkError::EmptyInput);
        }
        let dim = self.dim();
        let k_max = self.config.num_mixture;
        for x in input {
            check_length(dim, x.len())?;
        }
        let mut model = match self.config.initialization_type {
            InitializationType::None => {
                params.check(k_max, dim)?;
                params.clone()
            }
            InitializationType::KMeans => self.initialize(input)?,
            InitializationType::Ubm => self.ubm.clone().ok_or(SptkError::NotInitialized("universal background model"))?,
        };
        let map = self.config.smoothing_parameter > 0.0;
        let ubm = self.ubm.as_ref();
        let num_data = input.len() as f64;
        let mut occupancy = vec![0.0; k_max];
        let mut first_order = vec![vec![0.0; dim]; k_max];
        let mut second_order = vec![SymmetricMatrix::new(dim); k_max];
        let mut components = Vec::with_capacity(k_max);
        let mut buffer = GmmBuffer::default();
        let mut prev_log_likelihood = f64::MIN;
        let mut log_likelihood = f64::MIN;
        for n in 1..=self.config.num_iteration {
            occupancy.iter_mut().for_each(|x| *x = 0.0);
            first_order.iter_mut().for_each(|v| v.iter_mut().for_each(|x| *x = 0.0));
            second_order.iter_mut().for_each(|m| m.fill(0.0));
            buffer.invalidate();
            // E-step
            let mut total = 0.0;
            for x in input {
                let log_p = calculate_log_probability(x, &model, self.is_diagonal, Some(&mut components), &mut buffer)?;
                total += log_p;
                for k in 0..k_max {
                    let posterior = (components[k] - log_p).exp();
                    occupancy[k] += posterior;
                    first_order[k].iter_mut().zip(x.iter()).for_each(|(s, v)| *s += posterior * v);
                    for (l, m) in self.free_entries() {
                        second_order[k][(l, m)] += posterior * x[l] * x[m];
                    }
                }
            }
            // M-step
            let mut weights: Vec<f64> = if map {
                let z = 1.0 / (num_data + self.xi.iter().sum::<f64>());
                occupancy.iter().zip(self.xi.iter()).map(|(g, xi)| (g + xi) * z).collect()
            } else {
                occupancy.iter().map(|g| g / num_data).collect()
            };
            let weight_sum: f64 = weights.iter().sum();
            if !weight_sum.is_finite() || weight_sum <= 0.0 {
                return Err(SptkError::DegenerateModel);
            }
            self.floor_weight(&mut weights);
            model.weights = weights;
            for k in 0..k_max {
                let gamma = occupancy[k];
                match (map, ubm) {
                    (true, Some(u)) => {
                        let xi = self.xi[k];
                        let z = 1.0 / (gamma + xi);
                        for l in 0..dim {
                            model.means[k][l] = (first_order[k][l] + xi * u.means[k][l]) * z;
                        }
                        let mu = &model.means[k];
                        for (l, m) in self.free_entries() {
                            let (mu_l, mu_m) = if gamma > 0.0 {
                                (first_order[k][l] / gamma, first_order[k][m] / gamma)
                            } else {
                                (0.0, 0.0)
                            };
                            let a = second_order[k][(l, m)] - gamma * (mu_l * mu[m] + mu[l] * mu_m - mu[l] * mu[m]);
                            let b = xi * u.covariances[k][(l, m)];
                            let c = xi * (u.means[k][l] - mu[l]) * (u.means[k][m] - mu[m]);
                            model.covariances[k][(l, m)] = (a + b + c) * z;
                        }
                    }
                    _ => {
                        // an empty component keeps its previous shape
                        if gamma <= 0.0 {
                            continue;
                        }
                        let z = 1.0 / gamma;
                        for l in 0..dim {
                            model.means[k][l] = first_order[k][l] * z;
                        }
                        let mu = &model.means[k];
                        for (l, m) in self.free_entries() {
                            model.covariances[k][(l, m)] = second_order[k][(l, m)] * z - mu[l] * mu[m];
                        }
                    }
                }
            }
            self.floor_variance(&mut model.covariances);
            log_likelihood = total / num_data;
            let change = log_likelihood - prev_log_likelihood;
            if self.config.log_interval.is_some_and(|i| n % i == 0) {
                if n == 1 {
                    info!("iter {:>3} : average = {}", n, log_likelihood);
                } else {
                    info!("iter {:>3} : average = {}, change = {}", n, log_likelihood, change);
                }
            }
            if change < self.config.convergence_threshold {
                break;
            }
            prev_log_likelihood = log_likelihood;
        }
        *params = model;
        Ok(log_likelihood)
    }
}
