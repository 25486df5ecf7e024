//! Run report: the observable outcome of one reconciliation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::RunCounters;

/// Outcome of a completed reconciliation run.
///
/// The change log is the primary artifact: ordered, human-readable, with
/// entry order and literal text both part of the engine's contract. The
/// counters exist for reporting and telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run id, for correlating diagnostics.
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub counters: RunCounters,
    pub change_log: Vec<String>,
}

impl RunReport {
    /// Human-readable counter summary, suitable for terminal output and
    /// the notification body.
    #[must_use]
    pub fn summary(&self) -> String {
        let c = &self.counters;
        format!(
            "Matched: {} ({} by identifier, {} by secondary identifier, {} by name; {} written)\n\
             Unmatched: {} source, {} directory\n\
             Ignored: {} no-sync, {} already claimed, {} disabled, {} by group",
            c.matched_total(),
            c.identifier_matches,
            c.secondary_matches,
            c.name_matches,
            c.write_backs,
            c.source_unmatched,
            c.directory_unmatched,
            c.no_sync,
            c.already_claimed,
            c.disabled,
            c.group_ignored,
        )
    }
}
