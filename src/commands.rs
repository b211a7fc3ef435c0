//! Command line front end. Every subcommand streams raw host-endian doubles
//! from a file or stdin to stdout.
mod conversion;
mod gmm;
mod mlsacheck;
mod pitch;
mod statistics;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sptk::io::{read_vector, write_vector};
use sptk::utils::parser::parse_number;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, StdoutLock, Write};
use std::path::Path;
#[derive(Parser, Debug)]
#[command(author, version, about = "Speech signal processing toolkit", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert linear predictive coefficients to line spectral pairs
    Lpc2lsp(conversion::Lpc2lspArgs),
    /// Convert line spectral pairs to linear predictive coefficients
    Lsp2lpc(conversion::Lsp2lpcArgs),
    /// Convert linear predictive coefficients to PARCOR coefficients
    Lpc2par(conversion::Lpc2parArgs),
    /// Convert PARCOR coefficients to linear predictive coefficients
    Par2lpc(conversion::Par2lpcArgs),
    /// Convert mel-cepstrum to MLSA digital filter coefficients
    Mc2b(conversion::MlsaArgs),
    /// Convert MLSA digital filter coefficients to mel-cepstrum
    B2mc(conversion::MlsaArgs),
    /// Convert autocorrelation to composite sinusoidal modeling parameters
    Acr2csm(conversion::Acr2csmArgs),
    /// Convert mel-generalized line spectral pairs to a spectrum
    Mglsp2sp(conversion::Mglsp2spArgs),
    /// Check and fix the stability of the MLSA digital filter
    Mlsacheck(mlsacheck::MlsacheckArgs),
    /// Train a Gaussian mixture model
    Gmm(gmm::GmmArgs),
    /// Evaluate log-probabilities under a Gaussian mixture model
    Gmmp(gmm::GmmpArgs),
    /// Extract pitch from a waveform
    Pitch(pitch::PitchArgs),
    /// Compute short-time autocorrelation
    Acorr(statistics::AcorrArgs),
    /// Compute the element-wise median of vectors
    Median(statistics::MedianArgs),
}
impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Lpc2lsp(args) => conversion::lpc2lsp(args),
            Commands::Lsp2lpc(args) => conversion::lsp2lpc(args),
            Commands::Lpc2par(args) => conversion::lpc2par(args),
            Commands::Par2lpc(args) => conversion::par2lpc(args),
            Commands::Mc2b(args) => conversion::mc2b(args),
            Commands::B2mc(args) => conversion::b2mc(args),
            Commands::Acr2csm(args) => conversion::acr2csm(args),
            Commands::Mglsp2sp(args) => conversion::mglsp2sp(args),
            Commands::Mlsacheck(args) => mlsacheck::run(args),
            Commands::Gmm(args) => gmm::train(args),
            Commands::Gmmp(args) => gmm::evaluate(args),
            Commands::Pitch(args) => pitch::run(args),
            Commands::Acorr(args) => statistics::acorr(args),
            Commands::Median(args) => statistics::median(args),
        }
    }
}
/// Double option parser accepting the magic numbers of `parse_number`.
pub fn parse_double(arg: &str) -> std::result::Result<f64, String> {
    parse_number(arg).map_err(|e| e.to_string())
}
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(p) => {
            let file = File::open(p).with_context(|| format!("Cannot open file {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin().lock()))),
    }
}
pub fn open_output() -> BufWriter<StdoutLock<'static>> {
    BufWriter::new(io::stdout().lock())
}
/// Feeds every frame of `input_length` doubles to `process` together with
/// its index and writes whatever it leaves in the output vector.
pub fn for_each_frame<F>(infile: Option<&Path>, input_length: usize, mut process: F) -> Result<()>
where
    F: FnMut(usize, &[f64], &mut Vec<f64>) -> Result<()>,
{
    let mut input = open_input(infile)?;
    let mut output = open_output();
    let mut result = Vec::new();
    let mut index = 0;
    while let Some(frame) = read_vector::<f64, _>(&mut input, input_length, false)? {
        process(index, &frame, &mut result)?;
        write_vector(&result, &mut output).context("Failed to write output")?;
        index += 1;
    }
    output.flush()?;
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_parse_double() {
        assert_eq!(parse_double("0.35"), Ok(0.35));
        assert_eq!(parse_double("pi"), Ok(std::f64::consts::PI));
        assert!(parse_double("alpha").is_err());
    }
    #[test]
    fn test_cli_parses_subcommands() -> Result<()> {
        let cli = Cli::try_parse_from(["sptk", "mc2b", "-m", "12", "-a", "0.42"])?;
        match cli.command {
            Commands::Mc2b(args) => {
                assert_eq!(args.num_order, 12);
                assert_eq!(args.alpha, 0.42);
            }
            other => panic!("unexpected command {:?}", other),
        }
        let cli = Cli::try_parse_from(["sptk", "--verbose", "pitch", "-a", "2", "-o", "1"])?;
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Pitch(_)));
        assert!(Cli::try_parse_from(["sptk", "mc2b", "-a", "x"]).is_err());
        Ok(())
    }
}
