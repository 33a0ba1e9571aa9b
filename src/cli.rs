use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::error::CliError;
use crate::format::OutputFormat;

/// Immutable configuration used by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub format: OutputFormat,
    /// `None` streams to stdout
    pub output: Option<PathBuf>,
    pub verbosity: u8,
    pub quiet: bool,
}

/// User-facing CLI arguments (kept private to the CLI layer)
#[derive(Parser, Debug)]
#[command(
    name = "logpipe",
    version,
    about = "Stream a log file to stdout or a file, as plain text or a JSON array"
)]
struct Args {
    /// Path to the log file to read
    #[arg(value_name = "LOG_FILE")]
    input: Option<PathBuf>,

    /// Output type (json or text)
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "text")]
    format: String,

    /// Output file path; lines go to stdout when omitted
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Only report errors on stderr
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

impl TryFrom<Args> for Config {
    type Error = CliError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingInput)?;
        let format: OutputFormat = args.format.parse()?;
        if !input.exists() {
            return Err(CliError::input_not_found(input));
        }
        Ok(Config {
            input,
            format,
            output: args.output,
            verbosity: args.verbose,
            quiet: args.quiet,
        })
    }
}

/// Parse CLI options into a validated Config
pub fn parse() -> Result<Config, CliError> {
    Config::try_from(Args::parse())
}
