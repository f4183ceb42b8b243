//! Checksum cache for upload de-duplication.
//!
//! The service identifies file contents by MD5. The cache persists the
//! checksum of every track uploaded through this client. The service's own
//! checksum list is held in memory only and fetched once per process, so
//! tracks deleted on the service are uploaded again on the next run.

use crate::error::{ClientError, Result, Stage};
use chrono::{DateTime, Utc};
use ibcast_core::TrackId;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

const CHUNK_SIZE: usize = 8192;

/// Calculate the hex-encoded MD5 of a file's contents.
pub async fn file_md5(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Persisted checksum knowledge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumCache {
    /// Checksums of tracks uploaded through this client
    #[serde(default)]
    tracks: BTreeMap<TrackId, String>,
    /// Checksums uploaded without a track id in the response
    #[serde(default)]
    uploaded: BTreeSet<String>,
    /// Every checksum known to exist on the service
    #[serde(skip)]
    remote: BTreeSet<String>,
    #[serde(skip)]
    remote_fetched: bool,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl ChecksumCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache from `path`; a missing file is an empty cache.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No checksum cache yet");
                return Ok(Self::new());
            }
            Err(e) => return Err(ClientError::io(Stage::Cache)(e)),
        };

        let cache: Self = serde_json::from_str(&contents).map_err(|e| {
            ClientError::Cache(format!("failed to parse {}: {}", path.display(), e))
        })?;

        debug!(
            path = %path.display(),
            tracks = cache.tracks.len(),
            uploaded = cache.uploaded.len(),
            "Loaded checksum cache"
        );
        Ok(cache)
    }

    /// Write the cache to `path`, replacing any previous file.
    ///
    /// Written to a sibling temp file first so an interrupted write never
    /// leaves a truncated cache behind.
    pub async fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ClientError::io(Stage::Cache))?;
        }

        self.updated_at = Some(Utc::now());
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::Cache(format!("failed to serialize cache: {}", e)))?;

        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        tokio::fs::write(&temp, contents)
            .await
            .map_err(ClientError::io(Stage::Cache))?;
        tokio::fs::rename(&temp, path)
            .await
            .map_err(ClientError::io(Stage::Cache))?;

        info!(path = %path.display(), uploads = self.len(), "Saved checksum cache");
        Ok(())
    }

    /// Whether the service is known to have content with this checksum
    pub fn contains_checksum(&self, checksum: &str) -> bool {
        self.remote.contains(checksum)
    }

    /// Checksum recorded for a track uploaded through this client
    pub fn checksum_for(&self, track_id: &TrackId) -> Option<&str> {
        self.tracks.get(track_id).map(String::as_str)
    }

    /// False until the service's checksum list was fetched in this process
    pub fn remote_fetched(&self) -> bool {
        self.remote_fetched
    }

    /// Replace the in-memory list with the one reported by the service.
    pub fn replace_remote(&mut self, checksums: impl IntoIterator<Item = String>) {
        self.remote = checksums.into_iter().collect();
        self.remote_fetched = true;
    }

    /// Record a successful upload.
    pub fn record_upload(&mut self, track_id: Option<TrackId>, checksum: &str) {
        self.remote.insert(checksum.to_string());
        match track_id {
            Some(track_id) => {
                self.tracks.insert(track_id, checksum.to_string());
            }
            None => {
                self.uploaded.insert(checksum.to_string());
            }
        }
    }

    /// Whether this client uploaded content with this checksum
    pub fn was_uploaded(&self, checksum: &str) -> bool {
        self.uploaded.contains(checksum) || self.tracks.values().any(|c| c == checksum)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Number of uploads recorded
    pub fn len(&self) -> usize {
        self.tracks.len() + self.uploaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.uploaded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_md5() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.mp3");
        tokio::fs::write(&path, b"").await.unwrap();
        assert_eq!(file_md5(&path).await.unwrap(), "d41d8cd98f00b204e9800998ecf8427e");

        let path = dir.path().join("abc.mp3");
        tokio::fs::write(&path, b"abc").await.unwrap();
        assert_eq!(file_md5(&path).await.unwrap(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[tokio::test]
    async fn test_file_md5_spans_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.flac");
        let contents = vec![7u8; CHUNK_SIZE * 3 + 17];
        tokio::fs::write(&path, &contents).await.unwrap();

        let expected = hex::encode(Md5::digest(&contents));
        assert_eq!(file_md5(&path).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_missing_cache_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = ChecksumCache::load(&dir.path().join("nope.json")).await.unwrap();
        assert!(cache.is_empty());
        assert!(cache.updated_at().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("checksums.json");

        let mut cache = ChecksumCache::new();
        cache.record_upload(Some(TrackId::new("42")), "bbb");
        cache.record_upload(None, "ccc");
        cache.save(&path).await.unwrap();

        let loaded = ChecksumCache::load(&path).await.unwrap();
        assert_eq!(loaded.checksum_for(&TrackId::new("42")), Some("bbb"));
        assert!(loaded.was_uploaded("bbb"));
        assert!(loaded.was_uploaded("ccc"));
        assert!(loaded.updated_at().is_some());
        assert_eq!(loaded.len(), 2);
    }

    #[tokio::test]
    async fn test_service_list_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checksums.json");

        let mut cache = ChecksumCache::new();
        cache.replace_remote(vec!["aaa".to_string()]);
        cache.record_upload(None, "ccc");
        assert!(cache.remote_fetched());
        assert!(cache.contains_checksum("aaa"));
        assert!(cache.contains_checksum("ccc"));
        cache.save(&path).await.unwrap();

        let loaded = ChecksumCache::load(&path).await.unwrap();
        assert!(!loaded.remote_fetched());
        assert!(!loaded.contains_checksum("aaa"));
        assert!(!loaded.contains_checksum("ccc"));
        assert!(loaded.was_uploaded("ccc"));
    }

    #[test]
    fn test_replace_remote_drops_stale_checksums() {
        let mut cache = ChecksumCache::new();
        assert!(!cache.remote_fetched());

        cache.replace_remote(vec!["aaa".to_string(), "bbb".to_string()]);
        cache.replace_remote(vec!["bbb".to_string()]);

        assert!(!cache.contains_checksum("aaa"));
        assert!(cache.contains_checksum("bbb"));
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checksums.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        match ChecksumCache::load(&path).await {
            Err(ClientError::Cache(msg)) => assert!(msg.contains("checksums.json")),
            other => panic!("Expected Cache error, got: {:?}", other),
        }
    }
}
