#![allow(dead_code)]

use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Chainstate key-value store could not be opened
    #[error("chainstate store unavailable at {path}: {reason}")]
    StoreUnavailable { path: String, reason: String },

    /// LOCK file held by another process - the host node is running
    #[error("chainstate directory {path} is locked by a running node")]
    HostNodeRunning { path: String },

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested output column is not a recognised field name
    #[error("unknown column name: {0}")]
    BadColumnName(String),

    /// Decoder-level failure, folded in from the decoder's own error type
    #[error("decoder error: {0}")]
    Decoder(#[from] crate::decoder::DecoderError),
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
