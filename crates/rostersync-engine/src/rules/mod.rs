//! The ordered rule pipelines.
//!
//! Each rule is a named predicate over `(record, run state, options)`.
//! Pipelines are fixed ordered lists evaluated first-match-wins; the order
//! is a load-bearing contract, not a convenience. A record no rule handles
//! falls through to the driver's unmatched classification.

mod directory;
mod source;

pub use directory::{AlreadyClaimedCheck, DisabledCheck, IgnoreGroupCheck, NoSyncCheck};
pub use source::{
    ExclusionCheck, IdentifierMatch, NameMatch, SecondaryIdentifierMatch, ServiceAccountCheck,
};

use async_trait::async_trait;

use rostersync_core::{DirectoryRecord, ReconcileOptions, SourceRecord, WriteBackService};

use crate::error::EngineResult;
use crate::state::RunState;

/// Whether a rule fully handled the record it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Disposition {
    /// The record is classified; skip the remaining rules.
    Handled,
    /// Not this rule's concern; try the next one.
    Unhandled,
}

impl Disposition {
    pub fn is_handled(self) -> bool {
        matches!(self, Disposition::Handled)
    }
}

/// Read-only surroundings shared by every source-rule invocation of a run.
pub struct RunContext<'a> {
    /// Directory accounts in export order.
    pub directory: &'a [DirectoryRecord],
    pub options: &'a ReconcileOptions,
    /// Write-back collaborator used by the name-match rule.
    pub writer: &'a dyn WriteBackService,
}

/// A rule over one source record.
///
/// Source rules may suspend: the name-match rule performs the write-back
/// call, the engine's only side effect against the Directory System.
#[async_trait]
pub trait SourceRule: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        record: &SourceRecord,
        ctx: &RunContext<'_>,
        state: &mut RunState,
    ) -> EngineResult<Disposition>;
}

/// A rule over one directory account. Purely in-memory.
pub trait DirectoryRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(
        &self,
        account: &DirectoryRecord,
        options: &ReconcileOptions,
        state: &mut RunState,
    ) -> Disposition;
}

/// The source pipeline, in contract order.
#[must_use]
pub fn source_pipeline() -> Vec<Box<dyn SourceRule>> {
    vec![
        Box::new(ExclusionCheck),
        Box::new(ServiceAccountCheck),
        Box::new(IdentifierMatch),
        Box::new(SecondaryIdentifierMatch),
        Box::new(NameMatch),
    ]
}

/// The directory pipeline, in contract order.
#[must_use]
pub fn directory_pipeline() -> Vec<Box<dyn DirectoryRule>> {
    vec![
        Box::new(NoSyncCheck),
        Box::new(AlreadyClaimedCheck),
        Box::new(DisabledCheck),
        Box::new(IgnoreGroupCheck),
    ]
}

/// First directory account whose `attribute` parses to `external_id`.
pub(crate) fn find_by_identifier<'a>(
    directory: &'a [DirectoryRecord],
    attribute: &str,
    external_id: i64,
) -> Option<&'a DirectoryRecord> {
    directory
        .iter()
        .find(|account| account.attribute_i64(attribute) == Some(external_id))
}

/// First directory account matching both names case-insensitively.
pub(crate) fn find_by_name<'a>(
    directory: &'a [DirectoryRecord],
    first_name: &str,
    last_name: &str,
) -> Option<&'a DirectoryRecord> {
    directory.iter().find(|account| {
        account.given_name.to_lowercase() == first_name.to_lowercase()
            && account.surname.to_lowercase() == last_name.to_lowercase()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account(json: serde_json::Value) -> DirectoryRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_pipeline_order_is_fixed() {
        let names: Vec<_> = source_pipeline().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "exclusion-check",
                "service-account-check",
                "identifier-match",
                "secondary-identifier-match",
                "name-match",
            ]
        );

        let names: Vec<_> = directory_pipeline().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "no-sync-check",
                "already-claimed-check",
                "disabled-check",
                "ignore-group-check",
            ]
        );
    }

    #[test]
    fn test_find_by_identifier_parses_attribute() {
        let directory = vec![
            account(json!({
                "SamAccountName": "ghost",
                "GivenName": "No", "Surname": "Attr", "Enabled": true
            })),
            account(json!({
                "SamAccountName": "jdoe",
                "GivenName": "Jane", "Surname": "Doe", "Enabled": true,
                "extensionAttribute1": "42"
            })),
        ];

        let hit = find_by_identifier(&directory, "extensionAttribute1", 42).unwrap();
        assert_eq!(hit.sam_account_name, "jdoe");
        assert!(find_by_identifier(&directory, "extensionAttribute1", 43).is_none());
    }

    #[test]
    fn test_find_by_name_is_case_insensitive_and_ordered() {
        let directory = vec![
            account(json!({
                "SamAccountName": "first",
                "GivenName": "JANE", "Surname": "DOE", "Enabled": true
            })),
            account(json!({
                "SamAccountName": "second",
                "GivenName": "Jane", "Surname": "Doe", "Enabled": true
            })),
        ];

        let hit = find_by_name(&directory, "jane", "doe").unwrap();
        assert_eq!(hit.sam_account_name, "first");
        assert!(find_by_name(&directory, "jane", "smith").is_none());
    }
}
