//! Rules over directory accounts, in pipeline order.

use rostersync_core::config::NO_SYNC_SENTINEL;
use rostersync_core::{DirectoryRecord, ReconcileOptions};

use crate::rules::{DirectoryRule, Disposition};
use crate::state::RunState;

/// Accounts carrying the no-sync sentinel in their sync attribute are
/// permanently excluded from reconciliation.
pub struct NoSyncCheck;

impl DirectoryRule for NoSyncCheck {
    fn name(&self) -> &'static str {
        "no-sync-check"
    }

    fn evaluate(
        &self,
        account: &DirectoryRecord,
        options: &ReconcileOptions,
        state: &mut RunState,
    ) -> Disposition {
        if account.attribute_str(&options.sync_attribute) != Some(NO_SYNC_SENTINEL) {
            return Disposition::Unhandled;
        }
        state.counters.no_sync += 1;
        if options.output_ignored {
            state.change_log.push(format!(
                "Ignore: No Sync set on: {}",
                account.sam_account_name
            ));
        }
        Disposition::Handled
    }
}

/// Accounts already claimed by a source-side match were logged during the
/// source pass; counting them again here would double-report.
pub struct AlreadyClaimedCheck;

impl DirectoryRule for AlreadyClaimedCheck {
    fn name(&self) -> &'static str {
        "already-claimed-check"
    }

    fn evaluate(
        &self,
        account: &DirectoryRecord,
        _options: &ReconcileOptions,
        state: &mut RunState,
    ) -> Disposition {
        if !state.is_claimed(&account.sam_account_name) {
            return Disposition::Unhandled;
        }
        state.counters.already_claimed += 1;
        Disposition::Handled
    }
}

/// Disabled accounts are left alone.
pub struct DisabledCheck;

impl DirectoryRule for DisabledCheck {
    fn name(&self) -> &'static str {
        "disabled-check"
    }

    fn evaluate(
        &self,
        account: &DirectoryRecord,
        _options: &ReconcileOptions,
        state: &mut RunState,
    ) -> Disposition {
        if account.enabled {
            return Disposition::Unhandled;
        }
        state.counters.disabled += 1;
        Disposition::Handled
    }
}

/// Members of the configured ignore group are skipped; with no group
/// configured the rule never fires.
pub struct IgnoreGroupCheck;

impl DirectoryRule for IgnoreGroupCheck {
    fn name(&self) -> &'static str {
        "ignore-group-check"
    }

    fn evaluate(
        &self,
        account: &DirectoryRecord,
        options: &ReconcileOptions,
        state: &mut RunState,
    ) -> Disposition {
        let member = options
            .ignore_group
            .as_deref()
            .is_some_and(|group| account.is_member_of(group));
        if !member {
            return Disposition::Unhandled;
        }
        state.counters.group_ignored += 1;
        if options.output_ignored {
            state.change_log.push(format!(
                "Ignore: Group Membership set on: {}",
                account.sam_account_name
            ));
        }
        Disposition::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use serde_json::json;

    fn account(json: serde_json::Value) -> DirectoryRecord {
        serde_json::from_value(json).unwrap()
    }

    fn options() -> ReconcileOptions {
        ReconcileOptions::new("extensionAttribute1")
    }

    #[test]
    fn test_no_sync_sentinel_must_match_exactly() {
        let mut state = RunState::new(HashSet::new());
        let opts = options();

        let flagged = account(json!({
            "SamAccountName": "svc-backup",
            "GivenName": "Backup", "Surname": "Service", "Enabled": true,
            "extensionAttribute1": "ps2ad:no-sync"
        }));
        assert!(NoSyncCheck.evaluate(&flagged, &opts, &mut state).is_handled());
        assert_eq!(state.counters.no_sync, 1);
        // output_ignored off: silent.
        assert!(state.change_log.is_empty());

        let near_miss = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane", "Surname": "Doe", "Enabled": true,
            "extensionAttribute1": "ps2ad:no-sync-later"
        }));
        assert!(!NoSyncCheck.evaluate(&near_miss, &opts, &mut state).is_handled());

        // A numeric attribute value is not the sentinel.
        let numeric = account(json!({
            "SamAccountName": "jsmith",
            "GivenName": "John", "Surname": "Smith", "Enabled": true,
            "extensionAttribute1": 42
        }));
        assert!(!NoSyncCheck.evaluate(&numeric, &opts, &mut state).is_handled());
    }

    #[test]
    fn test_no_sync_log_gated_by_output_ignored() {
        let mut state = RunState::new(HashSet::new());
        let mut opts = options();
        opts.output_ignored = true;

        let flagged = account(json!({
            "SamAccountName": "svc-backup",
            "GivenName": "Backup", "Surname": "Service", "Enabled": true,
            "extensionAttribute1": "ps2ad:no-sync"
        }));
        assert!(NoSyncCheck.evaluate(&flagged, &opts, &mut state).is_handled());
        assert_eq!(state.change_log, vec!["Ignore: No Sync set on: svc-backup"]);
    }

    #[test]
    fn test_already_claimed_counts_silently() {
        let mut state = RunState::new(HashSet::new());
        state.claim("jdoe");
        let opts = options();

        let claimed = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane", "Surname": "Doe", "Enabled": true
        }));
        assert!(AlreadyClaimedCheck
            .evaluate(&claimed, &opts, &mut state)
            .is_handled());
        assert_eq!(state.counters.already_claimed, 1);
        assert!(state.change_log.is_empty());

        let fresh = account(json!({
            "SamAccountName": "jsmith",
            "GivenName": "John", "Surname": "Smith", "Enabled": true
        }));
        assert!(!AlreadyClaimedCheck
            .evaluate(&fresh, &opts, &mut state)
            .is_handled());
    }

    #[test]
    fn test_disabled_check() {
        let mut state = RunState::new(HashSet::new());
        let opts = options();

        let disabled = account(json!({
            "SamAccountName": "old",
            "GivenName": "Old", "Surname": "Account", "Enabled": false
        }));
        assert!(DisabledCheck.evaluate(&disabled, &opts, &mut state).is_handled());
        assert_eq!(state.counters.disabled, 1);

        let active = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane", "Surname": "Doe", "Enabled": true
        }));
        assert!(!DisabledCheck.evaluate(&active, &opts, &mut state).is_handled());
    }

    #[test]
    fn test_ignore_group_requires_configuration() {
        let mut state = RunState::new(HashSet::new());
        let member = account(json!({
            "SamAccountName": "jdoe",
            "GivenName": "Jane", "Surname": "Doe", "Enabled": true,
            "MemberOf": ["Contractors"]
        }));

        // No group configured: rule can never fire.
        let opts = options();
        assert!(!IgnoreGroupCheck.evaluate(&member, &opts, &mut state).is_handled());

        let mut opts = options();
        opts.ignore_group = Some("Contractors".to_string());
        opts.output_ignored = true;
        assert!(IgnoreGroupCheck.evaluate(&member, &opts, &mut state).is_handled());
        assert_eq!(state.counters.group_ignored, 1);
        assert_eq!(
            state.change_log,
            vec!["Ignore: Group Membership set on: jdoe"]
        );

        let outsider = account(json!({
            "SamAccountName": "jsmith",
            "GivenName": "John", "Surname": "Smith", "Enabled": true,
            "MemberOf": ["Staff"]
        }));
        assert!(!IgnoreGroupCheck
            .evaluate(&outsider, &opts, &mut state)
            .is_handled());
    }
}
