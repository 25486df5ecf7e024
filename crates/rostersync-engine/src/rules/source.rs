//! Rules over source records, in pipeline order.

use async_trait::async_trait;

use rostersync_core::config::SECONDARY_ID_ATTRIBUTE;
use rostersync_core::SourceRecord;

use crate::error::{EngineError, EngineResult};
use crate::rules::{find_by_identifier, find_by_name, Disposition, RunContext, SourceRule};
use crate::state::{ExclusionKey, RunState};

/// Silently skips records flagged ambiguous by the pre-pass.
pub struct ExclusionCheck;

#[async_trait]
impl SourceRule for ExclusionCheck {
    fn name(&self) -> &'static str {
        "exclusion-check"
    }

    async fn evaluate(
        &self,
        record: &SourceRecord,
        _ctx: &RunContext<'_>,
        state: &mut RunState,
    ) -> EngineResult<Disposition> {
        if state.is_excluded(&ExclusionKey::of(record)) {
            return Ok(Disposition::Handled);
        }
        Ok(Disposition::Unhandled)
    }
}

/// Silently skips service accounts; they never have a directory identity
/// of their own.
pub struct ServiceAccountCheck;

#[async_trait]
impl SourceRule for ServiceAccountCheck {
    fn name(&self) -> &'static str {
        "service-account-check"
    }

    async fn evaluate(
        &self,
        record: &SourceRecord,
        _ctx: &RunContext<'_>,
        _state: &mut RunState,
    ) -> EngineResult<Disposition> {
        if record.is_service_account() {
            return Ok(Disposition::Handled);
        }
        Ok(Disposition::Unhandled)
    }
}

/// Matches on the configured sync attribute: the steady state once an
/// account has been linked.
pub struct IdentifierMatch;

#[async_trait]
impl SourceRule for IdentifierMatch {
    fn name(&self) -> &'static str {
        "identifier-match"
    }

    async fn evaluate(
        &self,
        record: &SourceRecord,
        ctx: &RunContext<'_>,
        state: &mut RunState,
    ) -> EngineResult<Disposition> {
        let Some(account) =
            find_by_identifier(ctx.directory, &ctx.options.sync_attribute, record.external_id)
        else {
            return Ok(Disposition::Unhandled);
        };

        state.counters.identifier_matches += 1;
        if ctx.options.output_matched {
            state.change_log.push(format!(
                "DCID Matched: {} to {}; User OK!",
                record.external_id, account.sam_account_name
            ));
        }
        state.claim(&account.sam_account_name);
        Ok(Disposition::Handled)
    }
}

/// Fallback match on the fixed secondary identifier attribute, for
/// directories that carry the identifier in their HR field instead.
pub struct SecondaryIdentifierMatch;

#[async_trait]
impl SourceRule for SecondaryIdentifierMatch {
    fn name(&self) -> &'static str {
        "secondary-identifier-match"
    }

    async fn evaluate(
        &self,
        record: &SourceRecord,
        ctx: &RunContext<'_>,
        state: &mut RunState,
    ) -> EngineResult<Disposition> {
        if !ctx.options.check_employee_id {
            return Ok(Disposition::Unhandled);
        }
        let Some(account) =
            find_by_identifier(ctx.directory, SECONDARY_ID_ATTRIBUTE, record.external_id)
        else {
            return Ok(Disposition::Unhandled);
        };

        state.counters.secondary_matches += 1;
        if ctx.options.output_matched {
            state.change_log.push(format!(
                "DCID Matched (employeeID): {} to {}; User OK!",
                record.external_id, account.sam_account_name
            ));
        }
        state.claim(&account.sam_account_name);
        Ok(Disposition::Handled)
    }
}

/// Last resort: case-insensitive name equality, followed by persisting the
/// identifier onto the matched account (unless dry-run). A write-back
/// failure aborts the run.
pub struct NameMatch;

#[async_trait]
impl SourceRule for NameMatch {
    fn name(&self) -> &'static str {
        "name-match"
    }

    async fn evaluate(
        &self,
        record: &SourceRecord,
        ctx: &RunContext<'_>,
        state: &mut RunState,
    ) -> EngineResult<Disposition> {
        let Some(account) = find_by_name(ctx.directory, &record.first_name, &record.last_name)
        else {
            return Ok(Disposition::Unhandled);
        };

        if ctx.options.dry_run {
            state.counters.name_matches += 1;
            state.change_log.push(format!(
                "Add DCID: {} to {}",
                record.external_id, account.sam_account_name
            ));
        } else {
            ctx.writer
                .set_identifier(&account.sam_account_name, record.external_id)
                .await
                .map_err(|source| EngineError::WriteBack {
                    account: account.sam_account_name.clone(),
                    source,
                })?;
            state.counters.name_matches += 1;
            state.counters.write_backs += 1;
            state.change_log.push(format!(
                "Successfully Added- DCID: {} to {}",
                record.external_id, account.sam_account_name
            ));
        }
        state.claim(&account.sam_account_name);
        Ok(Disposition::Handled)
    }
}
