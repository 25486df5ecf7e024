//! Cached source record provider.
//!
//! Retrieved data is always written to the cache file, and the
//! `skip_fetch` mode serves the cache without touching the network —
//! useful for re-running a reconciliation offline or diffing against
//! yesterday's snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use rostersync_core::{
    RetrievalResult, SourceRecordProvider, SourceUnit, UnitSelector,
};

use crate::client::SourceClient;
use crate::error::{SourceError, SourceResult};

/// Cache file name under the configured cache directory.
const CACHE_FILE: &str = "source_data.json";

/// Source provider with a disk cache between the API and the engine.
pub struct SourceProvider {
    client: Option<SourceClient>,
    selectors: Vec<UnitSelector>,
    cache_dir: PathBuf,
    skip_fetch: bool,
}

impl SourceProvider {
    /// Provider that fetches from the API and refreshes the cache.
    #[must_use]
    pub fn new(client: SourceClient, selectors: Vec<UnitSelector>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Some(client),
            selectors,
            cache_dir: cache_dir.into(),
            skip_fetch: false,
        }
    }

    /// Provider that serves the cache only; retrieval fails if the cache
    /// file is missing.
    #[must_use]
    pub fn cache_only(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: None,
            selectors: Vec::new(),
            cache_dir: cache_dir.into(),
            skip_fetch: true,
        }
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    async fn load(&self) -> SourceResult<Vec<SourceUnit>> {
        let client = match &self.client {
            Some(client) if !self.skip_fetch => client,
            _ => {
                info!(path = %self.cache_path().display(), "skip_fetch set, serving source cache");
                return read_cache(&self.cache_path()).await;
            }
        };

        let units = client.fetch_units(&self.selectors).await?;
        write_cache(&self.cache_path(), &units).await?;
        info!(
            units = units.len(),
            path = %self.cache_path().display(),
            "source data retrieved and cached"
        );
        Ok(units)
    }
}

#[async_trait]
impl SourceRecordProvider for SourceProvider {
    async fn fetch_units(&self) -> RetrievalResult<Vec<SourceUnit>> {
        Ok(self.load().await?)
    }
}

async fn read_cache(path: &Path) -> SourceResult<Vec<SourceUnit>> {
    let bytes = tokio::fs::read(path).await.map_err(|source| SourceError::Cache {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn write_cache(path: &Path, units: &[SourceUnit]) -> SourceResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| SourceError::Cache {
                path: parent.display().to_string(),
                source,
            })?;
    }
    let bytes = serde_json::to_vec_pretty(units)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| SourceError::Cache {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostersync_core::SourceRecord;

    fn unit() -> SourceUnit {
        SourceUnit::new(
            "North High",
            vec![SourceRecord {
                external_id: 4,
                local_id: "3".into(),
                first_name: "The".to_string(),
                last_name: "Developer".to_string(),
                extra: serde_json::Map::new(),
            }],
        )
    }

    #[tokio::test]
    async fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILE);

        write_cache(&path, &[unit()]).await.unwrap();
        let back = read_cache(&path).await.unwrap();

        assert_eq!(back.len(), 1);
        assert_eq!(back[0].name, "North High");
        assert_eq!(back[0].staff[0].external_id, 4);
        assert_eq!(back[0].staff[0].local_id.as_str(), "3");
    }

    #[tokio::test]
    async fn test_cache_only_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SourceProvider::cache_only(dir.path());

        let err = provider.fetch_units().await.unwrap_err();
        assert!(err.to_string().contains("cache error"));
    }

    #[tokio::test]
    async fn test_cache_only_serves_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write_cache(&dir.path().join(CACHE_FILE), &[unit()])
            .await
            .unwrap();

        let provider = SourceProvider::cache_only(dir.path());
        let units = provider.fetch_units().await.unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].staff.len(), 1);
    }

    #[tokio::test]
    async fn test_write_cache_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CACHE_FILE);

        write_cache(&path, &[unit()]).await.unwrap();
        assert!(path.exists());
    }
}
