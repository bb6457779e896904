//! Error types for BranchSight

use thiserror::Error;

/// BranchSight error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for BranchSight
pub type Result<T> = std::result::Result<T, Error>;
