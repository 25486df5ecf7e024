//! Directory integration error types.

use thiserror::Error;

use rostersync_core::{RetrievalError, WriteBackError};

/// Errors from Directory System retrieval and script execution.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The shell refuses to run scripts at all.
    #[error("shell execution policy is '{policy}'; scripts cannot run")]
    ExecutionPolicy { policy: String },

    /// A script could not be launched.
    #[error("failed to launch {script}: {source}")]
    Launch {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// A script ran and exited unsuccessfully.
    #[error("{script} exited with {status}: {stderr}")]
    ScriptFailed {
        script: String,
        status: String,
        stderr: String,
    },

    /// Export file I/O failure.
    #[error("cache I/O failed at {path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Export payload did not parse.
    #[error("export did not parse: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl From<DirectoryError> for RetrievalError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Cache { path, source } => RetrievalError::Cache {
                path,
                message: source.to_string(),
            },
            DirectoryError::Malformed(inner) => RetrievalError::invalid_data(inner.to_string()),
            other => RetrievalError::Script {
                message: other.to_string(),
            },
        }
    }
}

impl DirectoryError {
    /// Convert a write-back script failure into the engine-facing error.
    pub(crate) fn into_write_back(self, account: &str) -> WriteBackError {
        match self {
            DirectoryError::Launch { source, .. } => WriteBackError::Launch {
                message: "edit script did not start".to_string(),
                source: Some(Box::new(source)),
            },
            other => WriteBackError::script_failed(account, other.to_string()),
        }
    }
}
