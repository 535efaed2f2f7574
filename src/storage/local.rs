//! Local filesystem storage implementation.
//!
//! Boundary documents are written atomically (temp file then rename) so a
//! crash mid-run never leaves a truncated `geo.json` behind. Directories
//! are created on demand as codes are first seen.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CrawlSummary, ErrorRecord};
use crate::storage::{BoundaryStore, ERROR_LOG_FILE, GEO_DOCUMENT, SUMMARY_FILE};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Storage key for a province boundary document.
    fn province_key(province_code: &str) -> String {
        format!("{}/{}", province_code, GEO_DOCUMENT)
    }

    /// Storage key for a city boundary document.
    fn city_key(province_code: &str, city_code: &str) -> String {
        format!("{}/{}/{}", province_code, city_code, GEO_DOCUMENT)
    }
}

#[async_trait]
impl BoundaryStore for LocalStore {
    async fn put_province(&self, province_code: &str, document: &Value) -> Result<()> {
        let key = Self::province_key(province_code);
        self.write_json(&key, document).await?;
        log::debug!("Stored province boundary at {}", key);
        Ok(())
    }

    async fn put_city(
        &self,
        province_code: &str,
        city_code: &str,
        document: &Value,
    ) -> Result<()> {
        let key = Self::city_key(province_code, city_code);
        self.write_json(&key, document).await?;
        log::debug!("Stored city boundary at {}", key);
        Ok(())
    }

    async fn write_summary(&self, summary: &CrawlSummary) -> Result<()> {
        self.write_json(SUMMARY_FILE, summary).await
    }

    async fn write_error_log(&self, errors: &[ErrorRecord]) -> Result<()> {
        self.write_json(ERROR_LOG_FILE, errors).await
    }

    async fn load_summary(&self) -> Result<Option<CrawlSummary>> {
        self.read_json(SUMMARY_FILE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryStats;
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        store.write_bytes("test.txt", b"hello").await.unwrap();
        let data = store.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let data = store.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_province_document_layout() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let doc = json!({"type": "FeatureCollection", "features": []});
        store.put_province("420000", &doc).await.unwrap();

        assert!(tmp.path().join("420000").join("geo.json").exists());
    }

    #[tokio::test]
    async fn test_city_document_nests_under_province() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let doc = json!({"type": "FeatureCollection", "features": []});
        store.put_city("420000", "420100", &doc).await.unwrap();

        let path = tmp.path().join("420000").join("420100").join("geo.json");
        assert!(path.exists());

        let bytes = tokio::fs::read(&path).await.unwrap();
        let loaded: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(loaded["type"], "FeatureCollection");
    }

    #[tokio::test]
    async fn test_summary_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        assert!(store.load_summary().await.unwrap().is_none());

        let summary = CrawlSummary {
            total: 5,
            success: 4,
            failed: 1,
            success_rate: "80.00%".to_string(),
            stats: SummaryStats::default(),
            timestamp: Utc::now(),
        };
        store.write_summary(&summary).await.unwrap();

        let loaded = store.load_summary().await.unwrap().unwrap();
        assert_eq!(loaded.total, 5);
        assert_eq!(loaded.success_rate, "80.00%");
        assert!(tmp.path().join("crawl_summary.json").exists());
    }

    #[tokio::test]
    async fn test_error_log_written() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        store.write_error_log(&[]).await.unwrap();
        assert!(tmp.path().join("error_log.json").exists());
    }
}
