//! Email notification for completed runs.
//!
//! Builds the message from the run report and hands it to the configured
//! SMTP relay. Delivery problems are notification errors, never run
//! errors: the reconciliation outcome is already on disk by the time this
//! service runs.

use thiserror::Error;
use tracing::{debug, info, warn};

use rostersync_engine::RunReport;

use crate::config::EmailSection;

/// Errors from the notification service.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// SMTP configuration is incomplete.
    #[error("notification configuration error: {0}")]
    Configuration(String),

    /// The message was built but not delivered.
    #[error("failed to send notification: {0}")]
    SendFailed(String),
}

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Sends the change log to the operators after a run.
pub struct NotificationService {
    config: EmailSection,
    enabled: bool,
}

impl NotificationService {
    #[must_use]
    pub fn new(config: EmailSection, enabled: bool) -> Self {
        Self { config, enabled }
    }

    /// A service that never sends.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(EmailSection::default(), false)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Build the subject line for a report.
    #[must_use]
    pub fn subject(report: &RunReport) -> String {
        format!(
            "Staff reconciliation report {}",
            report.completed_at.format("%Y-%m-%d")
        )
    }

    /// Build the plain-text body: counter summary, then the change log.
    #[must_use]
    pub fn body(report: &RunReport) -> String {
        let mut body = String::new();
        body.push_str(&report.summary());
        body.push_str("\n\n");
        if report.change_log.is_empty() {
            body.push_str("No changes recorded.\n");
        } else {
            for entry in &report.change_log {
                body.push_str(entry);
                body.push('\n');
            }
        }
        body
    }

    /// Send the report. Delivery requires a configured SMTP relay; without
    /// one this reports the failure so the caller can log it.
    pub fn send_report(&self, report: &RunReport) -> NotificationResult<()> {
        if !self.enabled {
            debug!("notifications disabled, skipping");
            return Ok(());
        }

        let host = self.config.host.as_ref().ok_or_else(|| {
            NotificationError::Configuration("email.host is not configured".to_string())
        })?;
        let from = self.config.from.as_ref().ok_or_else(|| {
            NotificationError::Configuration("email.from is not configured".to_string())
        })?;
        let to = self.config.to.as_ref().ok_or_else(|| {
            NotificationError::Configuration("email.to is not configured".to_string())
        })?;

        let subject = Self::subject(report);
        let body = Self::body(report);

        info!(
            host = %host,
            from = %from,
            to = %to,
            subject = %subject,
            entries = report.change_log.len(),
            "sending run notification"
        );

        // No SMTP relay integration is linked in; report non-delivery so
        // operators notice instead of assuming the mail went out.
        warn!(
            to = %to,
            subject = %subject,
            "notification NOT delivered: SMTP relay integration is not configured"
        );
        debug!(body = %body, "undelivered notification body");

        Err(NotificationError::SendFailed(
            "SMTP relay integration is not configured".to_string(),
        ))
    }
}
