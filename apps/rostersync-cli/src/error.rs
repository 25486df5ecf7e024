//! CLI error types and exit codes.

use thiserror::Error;

use rostersync_core::{RetrievalError, ValidationError};
use rostersync_engine::EngineError;

/// Exit codes:
/// - 0: success
/// - 1: general error
/// - 2: configuration error
/// - 3: retrieval error
/// - 4: validation error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not parse configuration file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Reconciliation failed: {0}")]
    Engine(#[from] EngineError),
}

impl CliError {
    /// Process exit code for this failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigParse(_) => 2,
            CliError::Retrieval(_) => 3,
            CliError::Validation(_) => 4,
            CliError::Io(_) | CliError::Engine(_) => 1,
        }
    }
}
