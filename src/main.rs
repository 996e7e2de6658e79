//! zipsweep: find stale files under a directory and archive them.
//!
//! Thin binary entry point. All logic lives in the `zipsweep-core`
//! and `zipsweep-cli` crates.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zipsweep_cli::{exit_code, run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose. Logs go to stderr so listings stay pipeable.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("zipsweep starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
