//! Errors from the shared logging and configuration helpers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug)]
pub enum CommonError {
    /// Creating the log directory or opening a log file
    #[error("log file setup failed: {0}")]
    Io(#[from] std::io::Error),

    /// A `LOG_*` variable or filter directive could not be understood
    #[error("invalid setting: {0}")]
    Config(String),

    /// A global subscriber was already installed
    #[error("cannot install tracing subscriber: {0}")]
    Logging(String),
}

impl CommonError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
