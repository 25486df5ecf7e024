//! Reconciliation driver.
//!
//! Three strictly sequential phases: the exclusion pre-pass, the source
//! pass, and the directory pass. Iteration order is preserved exactly —
//! unit order, staff order within each unit, directory export order —
//! because change-log ordering is observable contract.

use chrono::Utc;
use uuid::Uuid;

use rostersync_core::{
    DirectoryRecord, ReconcileOptions, SourceRecord, SourceUnit, WriteBackService,
};

use crate::error::EngineResult;
use crate::exclusion;
use crate::report::RunReport;
use crate::rules::{self, DirectoryRule, RunContext, SourceRule};
use crate::state::RunState;

/// Orchestrates one reconciliation run.
pub struct ReconciliationDriver {
    options: ReconcileOptions,
    source_rules: Vec<Box<dyn SourceRule>>,
    directory_rules: Vec<Box<dyn DirectoryRule>>,
}

impl ReconciliationDriver {
    /// Driver with the standard pipelines.
    #[must_use]
    pub fn new(options: ReconcileOptions) -> Self {
        Self {
            options,
            source_rules: rules::source_pipeline(),
            directory_rules: rules::directory_pipeline(),
        }
    }

    /// Run all three phases and return the ordered change log plus
    /// counters.
    ///
    /// A write-back failure aborts the run; the partial change log is
    /// discarded with the run state.
    pub async fn run(
        &self,
        units: &[SourceUnit],
        directory: &[DirectoryRecord],
        writer: &dyn WriteBackService,
    ) -> EngineResult<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(
            %run_id,
            units = units.len(),
            accounts = directory.len(),
            dry_run = self.options.dry_run,
            "starting reconciliation run"
        );

        let exclusions = exclusion::build(units);
        let mut state = RunState::new(exclusions);
        let ctx = RunContext {
            directory,
            options: &self.options,
            writer,
        };

        for unit in units {
            tracing::debug!(unit = %unit.name, staff = unit.staff.len(), "source pass");
            for record in &unit.staff {
                self.classify_source_record(record, &ctx, &mut state).await?;
            }
        }

        for account in directory {
            self.classify_directory_record(account, &mut state);
        }

        let (counters, change_log) = state.into_outcome();
        let report = RunReport {
            id: run_id,
            started_at,
            completed_at: Utc::now(),
            counters,
            change_log,
        };
        tracing::info!(
            %run_id,
            matched = counters.matched_total(),
            unmatched = counters.unmatched_total(),
            write_backs = counters.write_backs,
            "reconciliation run complete"
        );
        Ok(report)
    }

    async fn classify_source_record(
        &self,
        record: &SourceRecord,
        ctx: &RunContext<'_>,
        state: &mut RunState,
    ) -> EngineResult<()> {
        for rule in &self.source_rules {
            if rule.evaluate(record, ctx, state).await?.is_handled() {
                tracing::trace!(
                    rule = rule.name(),
                    external_id = record.external_id,
                    "source record handled"
                );
                return Ok(());
            }
        }

        state.counters.source_unmatched += 1;
        state.change_log.push(format!(
            "Not Found: (Source -> Directory) {}, {}; DCID: {}; Teacher Number: {}",
            record.first_name, record.last_name, record.external_id, record.local_id
        ));
        Ok(())
    }

    fn classify_directory_record(&self, account: &DirectoryRecord, state: &mut RunState) {
        for rule in &self.directory_rules {
            if rule.evaluate(account, &self.options, state).is_handled() {
                tracing::trace!(
                    rule = rule.name(),
                    account = %account.sam_account_name,
                    "directory record handled"
                );
                return;
            }
        }

        state.counters.directory_unmatched += 1;
        state.change_log.push(format!(
            "Not Found: (Directory -> Source) {}, {}; {}; last Logon Timestamp: {}",
            account.given_name,
            account.surname,
            account.sam_account_name,
            account.last_logon_display()
        ));
    }
}
