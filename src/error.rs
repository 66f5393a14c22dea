use thiserror::Error;

use crate::core::commands::CommandError;
use crate::core::config::ConfigError;
use crate::process::{ParseError, ProcessError};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Home directory not found")]
    HomeDirNotFound,
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    ProcessError(#[from] ProcessError),
    #[error("{0}")]
    CommandError(#[from] CommandError),
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("logging setup failed: {0}")]
    Logging(String),
}
