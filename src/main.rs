//! logpipe entry point: validates the CLI, sets up diagnostics and runs the pipeline.
//! Configuration errors surface here as a single `Error: ...` line on stderr.

mod cli;
mod error;
mod format;
mod pipeline;
mod sink;
mod source;

use std::process::ExitCode;

use anyhow::Result;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match cli::parse() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let result = match init_logging(&config) {
        Ok(()) => pipeline::run(config).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // context chain on one line, no backtrace
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr; stdout carries only the formatted log.
fn init_logging(config: &cli::Config) -> Result<()> {
    let level = if config.quiet {
        Level::ERROR
    } else {
        match config.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
