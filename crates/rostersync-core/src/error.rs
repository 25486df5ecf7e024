//! Shared error types for the collaborator boundary.
//!
//! Retrieval and write-back failures are fatal to a run and never retried
//! here; callers wanting resilience wrap the driver invocation.

use thiserror::Error;

/// Failure while retrieving records from either system.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Network failure talking to the Source System.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote rejected our credentials or withheld a token.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// External retrieval script failed.
    #[error("retrieval script failed: {message}")]
    Script { message: String },

    /// Cache file could not be read or written.
    #[error("cache error at {path}: {message}")]
    Cache { path: String, message: String },

    /// Retrieved payload did not match the expected shape.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// Retrieval configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl RetrievalError {
    /// Create a network error without an underlying source.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with an underlying source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an invalid-data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

/// Result type for retrieval operations.
pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Failure persisting an identifier onto a directory account.
#[derive(Debug, Error)]
pub enum WriteBackError {
    /// The edit script exited unsuccessfully.
    #[error("write-back script failed for {account}: {message}")]
    ScriptFailed { account: String, message: String },

    /// The edit script could not be launched.
    #[error("failed to launch write-back script: {message}")]
    Launch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Write-back configuration is unusable.
    #[error("invalid write-back configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl WriteBackError {
    /// Create a script-failure error.
    pub fn script_failed(account: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ScriptFailed {
            account: account.into(),
            message: message.into(),
        }
    }
}

/// A record sequence failed the pre-run schema check.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A source staff record is malformed.
    #[error("source record {index} in unit '{unit}': {message}")]
    SourceRecord {
        unit: String,
        index: usize,
        message: String,
    },

    /// A directory account is malformed.
    #[error("directory record {index}: {message}")]
    DirectoryRecord { index: usize, message: String },
}
