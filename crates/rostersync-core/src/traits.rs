//! Collaborator traits consumed by the reconciliation driver.
//!
//! The engine never talks to either system directly; it sees record
//! sequences and one write operation. All three traits are object-safe so
//! tests can substitute in-memory doubles.

use async_trait::async_trait;

use crate::error::{RetrievalResult, WriteBackError};
use crate::models::{DirectoryRecord, SourceUnit};

/// Supplies the ordered unit/staff sequences from the Source System.
#[async_trait]
pub trait SourceRecordProvider: Send + Sync {
    /// Retrieve every configured unit with its staff, in configuration
    /// order. Order is preserved into the change log.
    async fn fetch_units(&self) -> RetrievalResult<Vec<SourceUnit>>;
}

/// Supplies the ordered account sequence from the Directory System.
#[async_trait]
pub trait DirectoryRecordProvider: Send + Sync {
    /// Retrieve every exported directory account, in export order.
    async fn fetch_accounts(&self) -> RetrievalResult<Vec<DirectoryRecord>>;
}

/// The single side effect the engine performs against the Directory System:
/// persisting a discovered external identifier onto an account's sync
/// attribute.
#[async_trait]
pub trait WriteBackService: Send + Sync {
    /// Persist `external_id` onto the named account. Failure aborts the
    /// run in progress.
    async fn set_identifier(
        &self,
        sam_account_name: &str,
        external_id: i64,
    ) -> Result<(), WriteBackError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptySource;

    #[async_trait]
    impl SourceRecordProvider for EmptySource {
        async fn fetch_units(&self) -> RetrievalResult<Vec<SourceUnit>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_traits_are_object_safe() {
        let provider: Box<dyn SourceRecordProvider> = Box::new(EmptySource);
        let units = provider.fetch_units().await.unwrap();
        assert!(units.is_empty());
    }
}
