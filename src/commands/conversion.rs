use super::{for_each_frame, parse_double};
use anyhow::{bail, Context, Result};
use clap::Args;
use sptk::consts::SPTK_CONFIG;
use sptk::conversion::acr_to_csm::{AcrToCsm, AcrToCsmBuffer};
use sptk::conversion::lpc_to_lsp::{LpcToLsp, LpcToLspBuffer};
use sptk::conversion::lpc_to_parcor::{LpcToParcor, LpcToParcorBuffer};
use sptk::conversion::lsp_format::{from_stream, to_stream, FrequencyFormat, GainType};
use sptk::conversion::lsp_to_lpc::{LspToLpc, LspToLpcBuffer};
use sptk::conversion::mglsp_to_spectrum::{MglspToSpectrum, SpectrumFormat};
use sptk::conversion::mlsa::{MelCepstrumToMlsa, MlsaToMelCepstrum};
use sptk::conversion::parcor_to_lpc::{ParcorToLpc, ParcorToLpcBuffer};
use sptk::stability::WarningType;
use std::path::PathBuf;
use tracing::warn;
#[derive(Args, Debug)]
pub struct Lpc2lspArgs {
    /// Order of coefficients
    #[arg(short = 'm', default_value_t = 25)]
    pub num_order: usize,
    /// Sampling rate [kHz]
    #[arg(short = 's', default_value_t = 10.0, value_parser = parse_double)]
    pub sampling_rate: f64,
    /// Output gain type (0 linear, 1 log, 2 none)
    #[arg(short = 'k', default_value_t = 0)]
    pub gain_type: u8,
    /// Output format (0 rad, 1 cyc, 2 kHz, 3 Hz)
    #[arg(short = 'o', default_value_t = 0)]
    pub output_format: u8,
    /// Number of splits of the unit circle
    #[arg(short = 'n')]
    pub num_split: Option<usize>,
    /// Maximum number of bisections per root
    #[arg(short = 'i')]
    pub num_iteration: Option<usize>,
    /// Convergence threshold
    #[arg(short = 'd', value_parser = parse_double)]
    pub convergence_threshold: Option<f64>,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn lpc2lsp(args: Lpc2lspArgs) -> Result<()> {
    let gain = GainType::try_from(args.gain_type)?;
    let format = FrequencyFormat::try_from(args.output_format)?;
    let kernel = LpcToLsp::new(
        args.num_order,
        args.num_split.unwrap_or(SPTK_CONFIG.lsp_num_split),
        args.num_iteration.unwrap_or(SPTK_CONFIG.lsp_num_iteration),
        args.convergence_threshold.unwrap_or(SPTK_CONFIG.lsp_convergence_threshold),
    );
    if !kernel.is_valid() {
        bail!("Failed to initialize LPC to LSP conversion");
    }
    let mut buffer = LpcToLspBuffer::default();
    let mut lsp = Vec::new();
    for_each_frame(args.infile.as_deref(), args.num_order + 1, |_, lpc, out| {
        kernel.run(lpc, &mut lsp, &mut buffer).context("Failed to convert LPC to LSP")?;
        *out = to_stream(&lsp, gain, format, args.sampling_rate);
        Ok(())
    })
}
#[derive(Args, Debug)]
pub struct Lsp2lpcArgs {
    /// Order of coefficients
    #[arg(short = 'm', default_value_t = 25)]
    pub num_order: usize,
    /// Sampling rate [kHz]
    #[arg(short = 's', default_value_t = 10.0, value_parser = parse_double)]
    pub sampling_rate: f64,
    /// Input gain type (0 linear, 1 log, 2 none)
    #[arg(short = 'k', default_value_t = 0)]
    pub gain_type: u8,
    /// Input format (0 rad, 1 cyc, 2 kHz, 3 Hz)
    #[arg(short = 'q', default_value_t = 0)]
    pub input_format: u8,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
/// Frame length of an LSP stream, which carries no gain for `GainType::None`.
fn lsp_stream_length(num_order: usize, gain: GainType) -> usize {
    if gain == GainType::None { num_order } else { num_order + 1 }
}
pub fn lsp2lpc(args: Lsp2lpcArgs) -> Result<()> {
    let gain = GainType::try_from(args.gain_type)?;
    let format = FrequencyFormat::try_from(args.input_format)?;
    let kernel = LspToLpc::new(args.num_order);
    if !kernel.is_valid() {
        bail!("Failed to initialize LSP to LPC conversion");
    }
    let mut buffer = LspToLpcBuffer::default();
    let length = lsp_stream_length(args.num_order, gain);
    if length == 0 {
        bail!("Order must be positive when the gain is omitted");
    }
    for_each_frame(args.infile.as_deref(), length, |_, frame, out| {
        let lsp = from_stream(frame, gain, format, args.sampling_rate);
        kernel.run(&lsp, out, &mut buffer).context("Failed to convert LSP to LPC")
    })
}
#[derive(Args, Debug)]
pub struct Lpc2parArgs {
    /// Order of coefficients
    #[arg(short = 'm', default_value_t = 25)]
    pub num_order: usize,
    /// Gamma
    #[arg(short = 'g', default_value_t = 1.0, value_parser = parse_double, allow_hyphen_values = true)]
    pub gamma: f64,
    /// Gamma given as -1 / c
    #[arg(short = 'c', conflicts_with = "gamma")]
    pub c: Option<u32>,
    /// Warning type of unstable coefficients (0 ignore, 1 warn, 2 exit)
    #[arg(short = 'e', default_value_t = 0)]
    pub warning_type: u8,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
/// `-1 / c` when `c` is given, otherwise `gamma`.
pub fn resolve_gamma(gamma: f64, c: Option<u32>) -> Result<f64> {
    match c {
        Some(0) => bail!("c must be a positive integer"),
        Some(c) => Ok(-1.0 / c as f64),
        None => Ok(gamma),
    }
}
pub fn lpc2par(args: Lpc2parArgs) -> Result<()> {
    let warning = WarningType::try_from(args.warning_type)?;
    let kernel = LpcToParcor::new(args.num_order, resolve_gamma(args.gamma, args.c)?);
    if !kernel.is_valid() {
        bail!("Failed to initialize LPC to PARCOR conversion");
    }
    let mut buffer = LpcToParcorBuffer::default();
    for_each_frame(args.infile.as_deref(), args.num_order + 1, |index, lpc, out| {
        let is_stable = kernel.run(lpc, out, &mut buffer).context("Failed to convert LPC to PARCOR")?;
        if !is_stable {
            match warning {
                WarningType::Ignore => {}
                WarningType::Warn => warn!("{}th frame is unstable", index),
                WarningType::Exit => bail!("{}th frame is unstable", index),
            }
        }
        Ok(())
    })
}
#[derive(Args, Debug)]
pub struct Par2lpcArgs {
    /// Order of coefficients
    #[arg(short = 'm', default_value_t = 25)]
    pub num_order: usize,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn par2lpc(args: Par2lpcArgs) -> Result<()> {
    let kernel = ParcorToLpc::new(args.num_order);
    if !kernel.is_valid() {
        bail!("Failed to initialize PARCOR to LPC conversion");
    }
    let mut buffer = ParcorToLpcBuffer::default();
    for_each_frame(args.infile.as_deref(), args.num_order + 1, |_, parcor, out| {
        kernel.run(parcor, out, &mut buffer).context("Failed to convert PARCOR to LPC")
    })
}
#[derive(Args, Debug)]
pub struct MlsaArgs {
    /// Order of coefficients
    #[arg(short = 'm', default_value_t = 25)]
    pub num_order: usize,
    /// All-pass constant
    #[arg(short = 'a', default_value_t = 0.35, value_parser = parse_double, allow_hyphen_values = true)]
    pub alpha: f64,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn mc2b(args: MlsaArgs) -> Result<()> {
    let kernel = MelCepstrumToMlsa::new(args.num_order, args.alpha);
    if !kernel.is_valid() {
        bail!("Failed to initialize mel-cepstrum to MLSA conversion");
    }
    for_each_frame(args.infile.as_deref(), args.num_order + 1, |_, mc, out| {
        kernel.run(mc, out).context("Failed to convert mel-cepstrum to MLSA coefficients")
    })
}
pub fn b2mc(args: MlsaArgs) -> Result<()> {
    let kernel = MlsaToMelCepstrum::new(args.num_order, args.alpha);
    if !kernel.is_valid() {
        bail!("Failed to initialize MLSA to mel-cepstrum conversion");
    }
    for_each_frame(args.infile.as_deref(), args.num_order + 1, |_, b, out| {
        kernel.run(b, out).context("Failed to convert MLSA coefficients to mel-cepstrum")
    })
}
#[derive(Args, Debug)]
pub struct Acr2csmArgs {
    /// Order of autocorrelation, even
    #[arg(short = 'm', default_value_t = 24)]
    pub num_order: usize,
    /// Maximum number of root-finding iterations
    #[arg(short = 'i')]
    pub num_iteration: Option<usize>,
    /// Convergence threshold of root finding
    #[arg(short = 'd', value_parser = parse_double)]
    pub convergence_threshold: Option<f64>,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn acr2csm(args: Acr2csmArgs) -> Result<()> {
    let kernel = AcrToCsm::new(
        args.num_order,
        args.num_iteration.unwrap_or(SPTK_CONFIG.csm_num_iteration),
        args.convergence_threshold.unwrap_or(SPTK_CONFIG.csm_convergence_threshold),
    );
    if !kernel.is_valid() {
        bail!("Failed to initialize autocorrelation to CSM conversion, the order must be even and positive");
    }
    let mut buffer = AcrToCsmBuffer::default();
    for_each_frame(args.infile.as_deref(), args.num_order + 1, |_, r, out| {
        kernel.run(r, out, &mut buffer).context("Failed to convert autocorrelation to CSM parameters")
    })
}
#[derive(Args, Debug)]
pub struct Mglsp2spArgs {
    /// Order of mel-generalized line spectral pairs
    #[arg(short = 'm', default_value_t = 25)]
    pub num_order: usize,
    /// All-pass constant
    #[arg(short = 'a', default_value_t = 0.0, value_parser = parse_double, allow_hyphen_values = true)]
    pub alpha: f64,
    /// Gamma
    #[arg(short = 'g', default_value_t = -1.0, value_parser = parse_double, allow_hyphen_values = true)]
    pub gamma: f64,
    /// Gamma given as -1 / c
    #[arg(short = 'c', conflicts_with = "gamma")]
    pub c: Option<u32>,
    /// FFT length, the output holds l / 2 + 1 bins
    #[arg(short = 'l')]
    pub fft_length: Option<usize>,
    /// Sampling rate [kHz]
    #[arg(short = 's', default_value_t = 10.0, value_parser = parse_double)]
    pub sampling_rate: f64,
    /// Input gain type (0 linear, 1 log, 2 none)
    #[arg(short = 'k', default_value_t = 0)]
    pub gain_type: u8,
    /// Input format (0 rad, 1 cyc, 2 kHz, 3 Hz)
    #[arg(short = 'q', default_value_t = 0)]
    pub input_format: u8,
    /// Output format (0 20log|H|, 1 ln|H|, 2 |H|, 3 |H|^2)
    #[arg(short = 'o', default_value_t = 0)]
    pub output_format: u8,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn mglsp2sp(args: Mglsp2spArgs) -> Result<()> {
    let gain = GainType::try_from(args.gain_type)?;
    let input_format = FrequencyFormat::try_from(args.input_format)?;
    let output_format = SpectrumFormat::try_from(args.output_format)?;
    let gamma = resolve_gamma(args.gamma, args.c)?;
    let kernel = MglspToSpectrum::new(
        args.num_order,
        args.alpha,
        gamma,
        args.fft_length.unwrap_or(SPTK_CONFIG.fft_length),
    );
    if !kernel.is_valid() {
        bail!("Failed to initialize mel-generalized LSP to spectrum conversion");
    }
    let length = lsp_stream_length(args.num_order, gain);
    if length == 0 {
        bail!("Order must be positive when the gain is omitted");
    }
    let mut spectrum = Vec::with_capacity(kernel.output_length());
    for_each_frame(args.infile.as_deref(), length, |_, frame, out| {
        let mglsp = from_stream(frame, gain, input_format, args.sampling_rate);
        kernel.run(&mglsp, &mut spectrum).context("Failed to convert mel-generalized LSP to spectrum")?;
        out.clear();
        out.extend(spectrum.iter().map(|&s| output_format.apply(s)));
        Ok(())
    })
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;
    #[test]
    fn test_negative_values() -> Result<()> {
        let cli = Cli::try_parse_from(["sptk", "lpc2par", "-g", "-0.5"])?;
        let Commands::Lpc2par(args) = cli.command else { panic!("expected lpc2par") };
        assert_eq!(resolve_gamma(args.gamma, args.c)?, -0.5);
        let cli = Cli::try_parse_from(["sptk", "mc2b", "-a", "-0.35", "-m", "4"])?;
        let Commands::Mc2b(args) = cli.command else { panic!("expected mc2b") };
        assert_eq!(args.alpha, -0.35);
        assert_eq!(args.num_order, 4);
        let cli = Cli::try_parse_from(["sptk", "mglsp2sp", "-a", "-0.1", "-g", "-0.5"])?;
        let Commands::Mglsp2sp(args) = cli.command else { panic!("expected mglsp2sp") };
        assert_eq!((args.alpha, args.gamma), (-0.1, -0.5));
        Ok(())
    }
    #[test]
    fn test_resolve_gamma() -> Result<()> {
        assert_eq!(resolve_gamma(0.5, None)?, 0.5);
        assert_eq!(resolve_gamma(1.0, Some(2))?, -0.5);
        assert!(resolve_gamma(1.0, Some(0)).is_err());
        Ok(())
    }
    #[test]
    fn test_lsp_stream_length() {
        assert_eq!(lsp_stream_length(4, GainType::Linear), 5);
        assert_eq!(lsp_stream_length(4, GainType::Log), 5);
        assert_eq!(lsp_stream_length(4, GainType::None), 4);
    }
}
