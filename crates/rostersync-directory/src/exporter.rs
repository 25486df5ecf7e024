//! Directory account export.
//!
//! The export script is expected to leave the account list as JSON at
//! `{cache_dir}/directory_data.json`; this provider runs it and parses the
//! result. `skip_fetch` serves an existing export without running anything.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use rostersync_core::{DirectoryRecord, DirectoryRecordProvider, RetrievalResult};

use crate::error::{DirectoryError, DirectoryResult};
use crate::script::ScriptShell;

/// Export file name under the configured cache directory.
const CACHE_FILE: &str = "directory_data.json";

/// Runs the export script and ingests its JSON output.
#[derive(Debug, Clone)]
pub struct DirectoryExporter {
    shell: ScriptShell,
    export_script: PathBuf,
    cache_dir: PathBuf,
    skip_fetch: bool,
    verify_execution_policy: bool,
}

impl DirectoryExporter {
    /// Exporter that runs the script and refreshes the export file.
    #[must_use]
    pub fn new(
        shell: ScriptShell,
        export_script: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            shell,
            export_script: export_script.into(),
            cache_dir: cache_dir.into(),
            skip_fetch: false,
            verify_execution_policy: true,
        }
    }

    /// Serve the existing export file without running the script.
    #[must_use]
    pub fn skip_fetch(mut self, skip: bool) -> Self {
        self.skip_fetch = skip;
        self
    }

    /// Disable the execution-policy preflight (non-PowerShell shells).
    #[must_use]
    pub fn verify_execution_policy(mut self, verify: bool) -> Self {
        self.verify_execution_policy = verify;
        self
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    async fn load(&self) -> DirectoryResult<Vec<DirectoryRecord>> {
        if self.skip_fetch {
            info!(path = %self.cache_path().display(), "skip_fetch set, serving directory export");
            return read_export(&self.cache_path()).await;
        }

        if self.verify_execution_policy {
            self.shell.verify_execution_policy().await?;
        }
        self.shell.run(&self.export_script, &[]).await?;

        let records = read_export(&self.cache_path()).await?;
        info!(
            accounts = records.len(),
            path = %self.cache_path().display(),
            "directory export ingested"
        );
        Ok(records)
    }
}

#[async_trait]
impl DirectoryRecordProvider for DirectoryExporter {
    async fn fetch_accounts(&self) -> RetrievalResult<Vec<DirectoryRecord>> {
        Ok(self.load().await?)
    }
}

async fn read_export(path: &Path) -> DirectoryResult<Vec<DirectoryRecord>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| DirectoryError::Cache {
            path: path.display().to_string(),
            source,
        })?;
    Ok(serde_json::from_slice(&bytes)?)
}
