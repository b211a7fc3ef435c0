use super::{open_input, open_output, parse_double};
use anyhow::{bail, ensure, Context, Result};
use clap::Args;
use sptk::consts::SPTK_CONFIG;
use sptk::gmm::{
    calculate_log_probability, CovarianceType, GaussianMixtureModeling, GmmBuffer, GmmConfig, GmmParameters,
    InitializationType,
};
use sptk::io::{read_vector, write_scalar};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::info;
const DEFAULT_NUM_ORDER: usize = 25;
/// `-m` wins over `-l`, and `-l` is a length so it must be positive.
pub fn resolve_order(length: Option<usize>, order: Option<usize>) -> Result<usize> {
    match (order, length) {
        (Some(m), _) => Ok(m),
        (None, Some(0)) => bail!("Length of vector must be a positive integer"),
        (None, Some(l)) => Ok(l - 1),
        (None, None) => Ok(DEFAULT_NUM_ORDER),
    }
}
fn read_model(path: &Path, num_mixture: usize, dim: usize, is_diagonal: bool) -> Result<GmmParameters> {
    let file = File::open(path).with_context(|| format!("Cannot open file {}", path.display()))?;
    let mut reader = BufReader::new(file);
    GmmParameters::read(&mut reader, num_mixture, dim, is_diagonal)
        .with_context(|| format!("Failed to load GMM parameters from {}", path.display()))
}
#[derive(Args, Debug)]
pub struct GmmArgs {
    /// Length of vector
    #[arg(short = 'l')]
    pub length: Option<usize>,
    /// Order of vector
    #[arg(short = 'm')]
    pub order: Option<usize>,
    /// Number of mixtures
    #[arg(short = 'k', default_value_t = 16)]
    pub num_mixture: usize,
    /// Number of iterations
    #[arg(short = 'i', default_value_t = 20)]
    pub num_iteration: usize,
    /// Convergence threshold
    #[arg(short = 'd', default_value_t = 1e-5, value_parser = parse_double)]
    pub convergence_threshold: f64,
    /// Floor value of weight
    #[arg(short = 'w', default_value_t = 1e-5, value_parser = parse_double)]
    pub weight_floor: f64,
    /// Floor value of variance
    #[arg(short = 'v', default_value_t = 1e-6, value_parser = parse_double)]
    pub variance_floor: f64,
    /// MAP smoothing parameter, requires -U
    #[arg(short = 'M', default_value_t = 0.0, value_parser = parse_double, requires = "ubm")]
    pub smoothing_parameter: f64,
    /// Universal background model used as the initial GMM
    #[arg(short = 'U')]
    pub ubm: Option<PathBuf>,
    /// Use full covariance
    #[arg(short = 'f')]
    pub full_covariance: bool,
    /// Show log-likelihood
    #[arg(short = 'V')]
    pub show_likelihood: bool,
    /// Comma-separated block sizes of the covariance, summing to the vector length
    #[arg(short = 'B', value_delimiter = ',')]
    pub block_size: Vec<usize>,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
impl GmmArgs {
    fn to_config(&self) -> Result<GmmConfig> {
        Ok(GmmConfig {
            num_order: resolve_order(self.length, self.order)?,
            num_mixture: self.num_mixture,
            num_iteration: self.num_iteration,
            convergence_threshold: self.convergence_threshold,
            covariance_type: if self.full_covariance { CovarianceType::Full } else { CovarianceType::Diagonal },
            block_size: self.block_size.clone(),
            weight_floor: self.weight_floor,
            variance_floor: self.variance_floor,
            initialization_type: if self.ubm.is_some() { InitializationType::Ubm } else { InitializationType::KMeans },
            log_interval: self.show_likelihood.then_some(SPTK_CONFIG.gmm_log_interval),
            smoothing_parameter: self.smoothing_parameter,
        })
    }
}
/// Models are stored as variances only for a single diagonal block.
fn stored_as_diagonal(config: &GmmConfig) -> bool {
    config.covariance_type == CovarianceType::Diagonal && config.block_size.len() <= 1
}
pub fn train(args: GmmArgs) -> Result<()> {
    let config = args.to_config()?;
    let dim = config.num_order + 1;
    let mut input = open_input(args.infile.as_deref())?;
    let mut vectors = Vec::new();
    while let Some(vector) = read_vector::<f64, _>(&mut input, dim, false)? {
        vectors.push(vector);
    }
    if vectors.is_empty() {
        return Ok(());
    }
    let is_diagonal = stored_as_diagonal(&config);
    let ubm = match &args.ubm {
        Some(path) => Some(read_model(path, config.num_mixture, dim, is_diagonal)?),
        None => None,
    };
    let gmm = GaussianMixtureModeling::new(config, ubm);
    if !gmm.is_valid() {
        bail!("Failed to initialize GaussianMixtureModeling");
    }
    let mut params = GmmParameters::default();
    let log_likelihood = gmm.run(&vectors, &mut params).context(
        "Failed to train Gaussian mixture models. Please consider the following attempts: \
         a) increase training data; b) decrease number of mixtures; c) use (block) diagonal covariance",
    )?;
    if args.show_likelihood {
        info!("final average log-likelihood = {}", log_likelihood);
    }
    let mut output = open_output();
    params.write(&mut output, gmm.is_diagonal()).context("Failed to write GMM parameters")?;
    output.flush()?;
    Ok(())
}
#[derive(Args, Debug)]
pub struct GmmpArgs {
    /// Length of vector
    #[arg(short = 'l')]
    pub length: Option<usize>,
    /// Order of vector
    #[arg(short = 'm')]
    pub order: Option<usize>,
    /// Number of mixtures
    #[arg(short = 'k', default_value_t = 16)]
    pub num_mixture: usize,
    /// Use full covariance
    #[arg(short = 'f')]
    pub full_covariance: bool,
    /// Output the average over all vectors instead of one value per vector
    #[arg(short = 'a')]
    pub average: bool,
    /// GMM parameters
    pub gmm_file: PathBuf,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn evaluate(args: GmmpArgs) -> Result<()> {
    ensure!(args.num_mixture > 0, "Number of mixtures must be a positive integer");
    let dim = resolve_order(args.length, args.order)? + 1;
    let is_diagonal = !args.full_covariance;
    let params = read_model(&args.gmm_file, args.num_mixture, dim, is_diagonal)?;
    let mut input = open_input(args.infile.as_deref())?;
    let mut output = open_output();
    let mut buffer = GmmBuffer::default();
    let mut sum = 0.0;
    let mut count = 0usize;
    while let Some(vector) = read_vector::<f64, _>(&mut input, dim, false)? {
        let log_probability = calculate_log_probability(&vector, &params, is_diagonal, None, &mut buffer)
            .context("Failed to compute log-probability")?;
        if args.average {
            sum += log_probability;
            count += 1;
        } else {
            write_scalar(log_probability, &mut output).context("Failed to write log-probability")?;
        }
    }
    if args.average && count > 0 {
        write_scalar(sum / count as f64, &mut output).context("Failed to write log-probability")?;
    }
    output.flush()?;
    Ok(())
}
