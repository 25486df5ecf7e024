//! Source client error types.

use thiserror::Error;

use rostersync_core::RetrievalError;

/// Errors from Source System retrieval.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Client configuration is unusable (empty credentials, bad URL).
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The token endpoint rejected the credential exchange.
    #[error("token request rejected with status {status}: {body}")]
    TokenRejected { status: u16, body: String },

    /// The token endpoint answered without an access token.
    #[error("token response did not contain an access token")]
    TokenMissing,

    /// HTTP transport failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with an unexpected status.
    #[error("unexpected status {status} from {endpoint}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    /// Cache file I/O failure.
    #[error("cache I/O failed at {path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Cached or retrieved payload did not parse.
    #[error("payload did not parse: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

impl From<SourceError> for RetrievalError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidConfiguration { message } => {
                RetrievalError::InvalidConfiguration { message }
            }
            SourceError::TokenRejected { .. } | SourceError::TokenMissing => {
                RetrievalError::authentication(err.to_string())
            }
            SourceError::Request(inner) => {
                RetrievalError::network_with_source("source request failed", inner)
            }
            SourceError::UnexpectedStatus { .. } => RetrievalError::network(err.to_string()),
            SourceError::Cache { path, source } => RetrievalError::Cache {
                path,
                message: source.to_string(),
            },
            SourceError::Malformed(inner) => RetrievalError::invalid_data(inner.to_string()),
        }
    }
}
