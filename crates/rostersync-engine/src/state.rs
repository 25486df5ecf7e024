//! Shared mutable state for one reconciliation run.
//!
//! `RunState` is owned by the driver and passed to every rule by mutable
//! reference; it is never shared across threads or stored between runs.
//! The exclusion set is fixed at construction and the claimed-handle set
//! only grows.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use rostersync_core::SourceRecord;

/// Identity key of a source record flagged ambiguous by the exclusion
/// pre-pass. Name comparison is case-sensitive, exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExclusionKey {
    pub first_name: String,
    pub last_name: String,
    pub external_id: i64,
}

impl ExclusionKey {
    /// Key of the given record.
    #[must_use]
    pub fn of(record: &SourceRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            external_id: record.external_id,
        }
    }
}

/// One counter per terminal classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Source records matched on the sync attribute.
    #[serde(default)]
    pub identifier_matches: u32,
    /// Source records matched on the secondary identifier attribute.
    #[serde(default)]
    pub secondary_matches: u32,
    /// Source records matched by name equality.
    #[serde(default)]
    pub name_matches: u32,
    /// Identifiers persisted onto directory accounts.
    #[serde(default)]
    pub write_backs: u32,
    /// Source records no rule handled.
    #[serde(default)]
    pub source_unmatched: u32,
    /// Directory accounts carrying the no-sync sentinel.
    #[serde(default)]
    pub no_sync: u32,
    /// Directory accounts already claimed during the source pass.
    #[serde(default)]
    pub already_claimed: u32,
    /// Disabled directory accounts.
    #[serde(default)]
    pub disabled: u32,
    /// Directory accounts skipped for ignore-group membership.
    #[serde(default)]
    pub group_ignored: u32,
    /// Directory accounts no rule handled.
    #[serde(default)]
    pub directory_unmatched: u32,
}

impl RunCounters {
    /// Source records that ended up linked to a directory account.
    #[must_use]
    pub fn matched_total(&self) -> u32 {
        self.identifier_matches + self.secondary_matches + self.name_matches
    }

    /// Records on either side that found no counterpart.
    #[must_use]
    pub fn unmatched_total(&self) -> u32 {
        self.source_unmatched + self.directory_unmatched
    }
}

/// Mutable accumulator threaded through every rule invocation of one run.
#[derive(Debug)]
pub struct RunState {
    exclusions: HashSet<ExclusionKey>,
    found_identifiers: HashSet<String>,
    pub counters: RunCounters,
    pub change_log: Vec<String>,
}

impl RunState {
    /// State for a fresh run. The exclusion set is complete at this point
    /// and read-only for the rest of the run.
    #[must_use]
    pub fn new(exclusions: HashSet<ExclusionKey>) -> Self {
        Self {
            exclusions,
            found_identifiers: HashSet::new(),
            counters: RunCounters::default(),
            change_log: Vec::new(),
        }
    }

    /// Whether the record was flagged ambiguous by the pre-pass.
    #[must_use]
    pub fn is_excluded(&self, key: &ExclusionKey) -> bool {
        self.exclusions.contains(key)
    }

    /// Mark a directory handle as claimed by a source-side match.
    pub fn claim(&mut self, sam_account_name: &str) {
        self.found_identifiers.insert(sam_account_name.to_string());
    }

    /// Whether a source-side match already claimed this handle.
    #[must_use]
    pub fn is_claimed(&self, sam_account_name: &str) -> bool {
        self.found_identifiers.contains(sam_account_name)
    }

    /// Consume the state into its observable outcome.
    #[must_use]
    pub fn into_outcome(self) -> (RunCounters, Vec<String>) {
        (self.counters, self.change_log)
    }
}
