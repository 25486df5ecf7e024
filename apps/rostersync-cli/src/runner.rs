//! Run orchestration: fetch, validate, reconcile, persist, notify.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use rostersync_core::validate::{validate_directory_records, validate_source_units};
use rostersync_core::{
    DirectoryRecordProvider, SourceRecordProvider, WriteBackError, WriteBackService,
};
use rostersync_directory::{DirectoryExporter, EditCredentials, ScriptWriteBack};
use rostersync_engine::{ReconciliationDriver, RunReport};
use rostersync_source::{SourceAuth, SourceClient, SourceCredentials, SourceProvider};

use crate::config::Settings;
use crate::error::{CliError, CliResult};
use crate::notify::NotificationService;

/// Run one reconciliation from resolved settings, persist the change log,
/// and send the optional notification. Returns the run report.
pub async fn run(settings: &Settings) -> CliResult<RunReport> {
    let source = build_source_provider(settings)?;
    let directory = build_directory_provider(settings)?;

    let units = source.fetch_units().await?;
    let accounts = directory.fetch_accounts().await?;
    info!(
        units = units.len(),
        accounts = accounts.len(),
        "both record sequences retrieved"
    );

    validate_source_units(&units)?;
    validate_directory_records(&accounts)?;

    let writer = build_writer(settings)?;
    let driver = ReconciliationDriver::new(settings.reconcile_options());
    let report = driver.run(&units, &accounts, writer.as_ref()).await?;

    let log_path = persist_report(&report, &settings.cache_path).await?;
    info!(path = %log_path.display(), "change log written");

    let notifier = NotificationService::new(settings.email.clone(), settings.send_email);
    if let Err(err) = notifier.send_report(&report) {
        warn!(error = %err, "run notification failed");
    }

    Ok(report)
}

fn build_source_provider(settings: &Settings) -> CliResult<Box<dyn SourceRecordProvider>> {
    if settings.skip_source {
        return Ok(Box::new(SourceProvider::cache_only(&settings.cache_path)));
    }

    let (id, secret, url) = settings.server_credentials()?;
    if settings.schools.is_empty() {
        return Err(CliError::Config(
            "no schools configured for source retrieval".to_string(),
        ));
    }

    let http = reqwest::Client::new();
    let auth = SourceAuth::new(&url, SourceCredentials::new(id, secret), http.clone());
    let client = SourceClient::new(&url, auth, http);
    Ok(Box::new(SourceProvider::new(
        client,
        settings.schools.clone(),
        &settings.cache_path,
    )))
}

fn build_directory_provider(settings: &Settings) -> CliResult<Box<dyn DirectoryRecordProvider>> {
    if settings.skip_directory {
        let exporter = DirectoryExporter::new(
            settings.script_shell(),
            PathBuf::new(),
            &settings.cache_path,
        )
        .skip_fetch(true);
        return Ok(Box::new(exporter));
    }

    let export_script = settings.scripts.user_list.clone().ok_or_else(|| {
        CliError::Config("missing required config key: scripts.user_list".to_string())
    })?;

    let exporter = DirectoryExporter::new(settings.script_shell(), export_script, &settings.cache_path)
        .verify_execution_policy(settings.scripts.verify_execution_policy.unwrap_or(true));
    Ok(Box::new(exporter))
}

fn build_writer(settings: &Settings) -> CliResult<Box<dyn WriteBackService>> {
    if settings.dry_run {
        return Ok(Box::new(DryRunWriter));
    }

    let edit_script = settings.scripts.edit_user.clone().ok_or_else(|| {
        CliError::Config("missing required config key: scripts.edit_user".to_string())
    })?;
    let credentials = settings.edit_credentials.clone().ok_or_else(|| {
        CliError::Config("missing required config key: edit_credentials".to_string())
    })?;

    Ok(Box::new(ScriptWriteBack::new(
        settings.script_shell(),
        edit_script,
        EditCredentials {
            username: credentials.username,
            password: credentials.password,
        },
    )))
}

/// Placeholder writer for dry runs; the engine never invokes it.
struct DryRunWriter;

#[async_trait]
impl WriteBackService for DryRunWriter {
    async fn set_identifier(
        &self,
        sam_account_name: &str,
        external_id: i64,
    ) -> Result<(), WriteBackError> {
        debug!(
            account = %sam_account_name,
            external_id,
            "dry run, skipping directory write"
        );
        Ok(())
    }
}

/// Write the change log and counter summary to a dated file under the
/// cache directory. Returns the file path.
pub async fn persist_report(report: &RunReport, cache_dir: &Path) -> CliResult<PathBuf> {
    let path = cache_dir.join(format!("reconcile-{}.log", Utc::now().format("%Y-%m-%d")));

    let mut content = String::new();
    for entry in &report.change_log {
        content.push_str(entry);
        content.push('\n');
    }
    content.push('\n');
    content.push_str(&report.summary());
    content.push('\n');

    tokio::fs::create_dir_all(cache_dir).await?;
    tokio::fs::write(&path, content).await?;
    Ok(path)
}
