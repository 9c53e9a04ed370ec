//! Binary entry point.
//!
//! Logging comes up first so everything after it can emit structured
//! diagnostics, then the parsed command runs and its summary is written to
//! stdout. A failing run is reported as a structured `error!` event that
//! carries the stable core error code when one applies, and the process
//! exits non-zero.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, field};

use burrow_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging,
};
use burrow_core::ReorderErrorCode;

fn run() -> Result<()> {
    let summary = run_cli(Cli::parse()).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")
}

/// The stable code of the core error behind `err`, when the failure
/// originated in the reordering engine rather than in I/O or parsing.
fn core_error_code(err: &anyhow::Error) -> Option<ReorderErrorCode> {
    match err.downcast_ref::<CliError>() {
        Some(CliError::Core(core)) => Some(core.code()),
        _ => None,
    }
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        // tracing is not up yet; stderr is all we have.
        eprintln!("failed to set up logging: {err}");
        return ExitCode::FAILURE;
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = core_error_code(&err).map(|code| field::display(code.as_str()));
            error!(error = %err, code, "command failed");
            ExitCode::FAILURE
        }
    }
}
