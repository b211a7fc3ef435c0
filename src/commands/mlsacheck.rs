use super::{for_each_frame, parse_double};
use anyhow::{bail, ensure, Context, Result};
use clap::Args;
use sptk::stability::{default_threshold, MlsaStabilityCheck, MlsaStabilityCheckBuffer, ModificationType, WarningType};
use std::path::PathBuf;
use tracing::{debug, warn};
#[derive(Args, Debug)]
pub struct MlsacheckArgs {
    /// Order of mel-cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    pub num_order: usize,
    /// FFT length
    #[arg(short = 'l', default_value_t = 256)]
    pub fft_length: usize,
    /// All-pass constant
    #[arg(short = 'a', default_value_t = 0.35, value_parser = parse_double, allow_hyphen_values = true)]
    pub alpha: f64,
    /// Order of the Pade approximation (4 to 7)
    #[arg(short = 'P', default_value_t = 4)]
    pub pade_order: usize,
    /// Use the stability-only threshold instead of the bounded-error one
    #[arg(short = 'k')]
    pub lax_threshold: bool,
    /// Threshold overriding the Pade default
    #[arg(short = 'r', value_parser = parse_double)]
    pub threshold: Option<f64>,
    /// Fast mode, checks the absolute sum of coefficients without an FFT
    #[arg(short = 'f')]
    pub fast_mode: bool,
    /// Modification type (0 clipping, 1 scaling)
    #[arg(short = 't', default_value_t = 0)]
    pub modification_type: u8,
    /// Write the modified mel-cepstrum instead of the input
    #[arg(short = 'x')]
    pub modify: bool,
    /// Warning type of unstable frames (0 ignore, 1 warn, 2 exit)
    #[arg(short = 'e', default_value_t = 1)]
    pub warning_type: u8,
    /// Input file, stdin when omitted
    pub infile: Option<PathBuf>,
}
pub fn resolve_threshold(threshold: Option<f64>, pade_order: usize, keep_maximum_error: bool) -> Result<f64> {
    match threshold {
        Some(r) => {
            ensure!(r > 0.0, "Threshold must be positive, got {}", r);
            Ok(r)
        }
        None => Ok(default_threshold(pade_order, keep_maximum_error)?),
    }
}
pub fn run(args: MlsacheckArgs) -> Result<()> {
    let warning = WarningType::try_from(args.warning_type)?;
    let modification = ModificationType::try_from(args.modification_type)?;
    let threshold = resolve_threshold(args.threshold, args.pade_order, !args.lax_threshold)?;
    let kernel = MlsaStabilityCheck::new(
        args.num_order,
        args.alpha,
        threshold,
        args.fast_mode,
        args.fft_length,
        modification,
    );
    if !kernel.is_valid() {
        bail!("Failed to initialize the MLSA stability check");
    }
    let mut buffer = MlsaStabilityCheckBuffer::default();
    let mut modified = Vec::new();
    for_each_frame(args.infile.as_deref(), args.num_order + 1, |index, mc, out| {
        let report = if args.modify {
            kernel.run(mc, Some(&mut modified), &mut buffer)
        } else {
            kernel.run(mc, None, &mut buffer)
        }
        .with_context(|| format!("Failed to check the stability of {}th frame", index))?;
        debug!("frame {}: maximum = {}", index, report.maximum_amplitude);
        if !report.is_stable {
            let message = format!(
                "{}th frame is unstable (maximum = {}, threshold = {})",
                index,
                report.maximum_amplitude,
                kernel.threshold()
            );
            match warning {
                WarningType::Ignore => {}
                WarningType::Warn => warn!("{}", message),
                WarningType::Exit => bail!(message),
            }
        }
        out.clear();
        out.extend_from_slice(if args.modify { &modified } else { mc });
        Ok(())
    })
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;
    #[test]
    fn test_negative_alpha() -> Result<()> {
        let cli = Cli::try_parse_from(["sptk", "mlsacheck", "-a", "-0.35"])?;
        let Commands::Mlsacheck(args) = cli.command else { panic!("expected mlsacheck") };
        assert_eq!(args.alpha, -0.35);
        Ok(())
    }
    #[test]
    fn test_resolve_threshold() -> Result<()> {
        assert_eq!(resolve_threshold(None, 4, true)?, 4.5);
        assert_eq!(resolve_threshold(None, 5, false)?, 7.65);
        assert_eq!(resolve_threshold(Some(3.0), 9, true)?, 3.0);
        assert!(resolve_threshold(Some(0.0), 4, true).is_err());
        assert!(resolve_threshold(None, 3, true).is_err());
        Ok(())
    }
}
