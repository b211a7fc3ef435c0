mod commands;
use clap::Parser;
use commands::Cli;
use mimalloc::MiMalloc;
use sptk::consts::SPTK_CONFIG;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        SPTK_CONFIG.log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO)
    };
    tracing_subscriber::registry()
        .with(level)
        .with(fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_thread_names(false))
        .init();
}
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
