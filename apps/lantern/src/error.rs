//! Top-level failures of the binary. Command failures are reported per line
//! and never reach this type.

use crate::config::ConfigError;
use rustyline::error::ReadlineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid store endpoint `{url}`: {reason}")]
    Endpoint { url: String, reason: String },

    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("terminal error: {0}")]
    Terminal(#[from] ReadlineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
