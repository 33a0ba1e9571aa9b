//! Errors raised while turning command-line arguments into a `Config`.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration failures detected before the pipeline starts
#[derive(Debug, Error)]
pub enum CliError {
    #[error("log file required")]
    MissingInput,

    #[error("invalid output type: {0}")]
    InvalidFormat(String),

    #[error("log file not exist: {}", path.display())]
    InputNotFound { path: PathBuf },
}

impl CliError {
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }
}
