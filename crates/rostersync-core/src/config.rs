//! Reconciliation options and shared literals.
//!
//! `ReconcileOptions` is the slice of the application configuration the
//! engine actually consumes. The CLI assembles it from the YAML file and
//! command-line overrides.

use serde::{Deserialize, Serialize};

/// Sentinel value in the sync attribute marking an account as permanently
/// excluded from reconciliation.
pub const NO_SYNC_SENTINEL: &str = "ps2ad:no-sync";

/// Local-id prefix identifying service accounts in the Source System.
pub const SERVICE_ACCOUNT_PREFIX: &str = "SVC-";

/// Directory attribute searched by the secondary identifier match. Fixed by
/// design, not configurable.
pub const SECONDARY_ID_ATTRIBUTE: &str = "EmployeeID";

/// Directory attribute holding the last-logon timestamp, shown for
/// diagnostic purposes on unmatched directory accounts.
pub const LAST_LOGON_ATTRIBUTE: &str = "LastLogonTimestamp";

/// Placeholder printed when a diagnostic display field is absent.
pub const MISSING_FIELD_PLACEHOLDER: &str = "undefined";

/// Options consumed by the reconciliation engine for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Directory attribute that stores the cross-system identifier and the
    /// no-sync sentinel.
    pub sync_attribute: String,

    /// Report what would change without invoking the write-back service.
    #[serde(default)]
    pub dry_run: bool,

    /// Emit a change-log entry for every successful identifier match.
    #[serde(default)]
    pub output_matched: bool,

    /// Emit a change-log entry for every ignored directory account.
    #[serde(default)]
    pub output_ignored: bool,

    /// Also search the fixed secondary identifier attribute.
    #[serde(default)]
    pub check_employee_id: bool,

    /// Directory group whose members are skipped during the directory pass.
    /// `None` disables the group rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_group: Option<String>,
}

impl ReconcileOptions {
    /// Options for the given sync attribute with every gate off.
    pub fn new(sync_attribute: impl Into<String>) -> Self {
        Self {
            sync_attribute: sync_attribute.into(),
            dry_run: false,
            output_matched: false,
            output_ignored: false,
            check_employee_id: false,
            ignore_group: None,
        }
    }
}

/// One unit (school) to retrieve from the Source System.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSelector {
    /// Source-side unit identifier, used in retrieval URLs.
    pub id: String,
    /// Display name. Falls back to the id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UnitSelector {
    /// Display label for logs and reports.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
