//! Engine error types.

use thiserror::Error;

use rostersync_core::WriteBackError;

/// Errors that abort a reconciliation run.
///
/// A failed run returns no report: the change log accumulated before the
/// failure is discarded. Callers wanting partial results must wrap the
/// driver invocation with their own recovery.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Persisting an identifier onto a directory account failed.
    #[error("write-back failed for {account}")]
    WriteBack {
        account: String,
        #[source]
        source: WriteBackError,
    },
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
