//! On-disk response cache with time-to-live.
//!
//! Responses are keyed by a signature of the request parameters and stored
//! one JSON file per key. An entry older than the TTL is treated as absent
//! and removed when read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{Result, SearchIntent, SearchQuery, SearchResult, TimeRange};

/// Default time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Serialize)]
struct Signature<'a> {
    query: &'a str,
    limit: usize,
    site: Option<&'a str>,
    time_range: Option<TimeRange>,
    preferred_source: Option<&'a str>,
    intent: Option<SearchIntent>,
}

/// Computes the cache signature of a query.
///
/// SHA-256 of the canonical JSON of every parameter that can change the
/// response: text, limit, site scope, time range, pinned source and
/// caller-forced intent.
pub fn signature(query: &SearchQuery) -> String {
    let canonical = Signature {
        query: &query.query,
        limit: query.limit,
        site: query.site.as_deref(),
        time_range: query.time_range,
        preferred_source: query.preferred_source.as_deref(),
        intent: query.intent,
    };
    let bytes = serde_json::to_vec(&canonical).unwrap_or_else(|_| query.query.as_bytes().to_vec());
    hex::encode(Sha256::digest(&bytes))
}

/// Cache usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of stored entries.
    pub total: usize,
    /// Entries still within their TTL.
    pub valid: usize,
    /// Entries past their TTL (or unreadable).
    pub expired: usize,
    /// Total size of stored entries in bytes.
    pub size_bytes: u64,
    /// Cache location.
    pub cache_dir: String,
}

/// Storage for previously produced responses.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the cached results for a signature, if present and fresh.
    async fn get(&self, signature: &str) -> Result<Option<Vec<SearchResult>>>;

    /// Stores results under a signature.
    async fn set(&self, signature: &str, query: &str, results: &[SearchResult]) -> Result<()>;

    /// Removes every entry, returning how many were removed.
    async fn clear(&self) -> Result<usize>;

    /// Removes expired or unreadable entries, returning how many were removed.
    async fn clear_expired(&self) -> Result<usize>;

    /// Returns usage statistics.
    async fn stats(&self) -> Result<CacheStats>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    query: String,
    cached_at: DateTime<Utc>,
    ttl_secs: u64,
    results: Vec<SearchResult>,
}

impl CacheEntry {
    /// Expiry follows the TTL the entry was written with.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.cached_at);
        age.to_std()
            .map(|age| age > Duration::from_secs(self.ttl_secs))
            .unwrap_or(false)
    }
}

/// A [`ResponseCache`] storing one JSON file per signature in a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// Creates a cache rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Sets the time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the platform cache directory for this crate.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("a3s-unisearch"))
    }

    /// Returns the cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entry_path(&self, signature: &str) -> PathBuf {
        self.dir.join(format!("{signature}.json"))
    }

    async fn read_entry(path: &Path) -> Option<(CacheEntry, u64)> {
        let bytes = tokio::fs::read(path).await.ok()?;
        let size = bytes.len() as u64;
        serde_json::from_slice(&bytes).ok().map(|entry| (entry, size))
    }

    async fn write_entry(
        &self,
        signature: &str,
        query: &str,
        results: &[SearchResult],
        cached_at: DateTime<Utc>,
    ) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let entry = CacheEntry {
            query: query.to_string(),
            cached_at,
            ttl_secs: self.ttl.as_secs(),
            results: results.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&entry)
            .map_err(|e| crate::SearchError::Other(format!("Failed to encode cache entry: {e}")))?;
        tokio::fs::write(self.entry_path(signature), json).await?;
        Ok(())
    }

    async fn entry_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl ResponseCache for FileCache {
    async fn get(&self, signature: &str) -> Result<Option<Vec<SearchResult>>> {
        let path = self.entry_path(signature);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }

        let Some((entry, _)) = Self::read_entry(&path).await else {
            debug!(signature, "removing unreadable cache entry");
            let _ = tokio::fs::remove_file(&path).await;
            return Ok(None);
        };

        if entry.is_expired(Utc::now()) {
            debug!(signature, "removing expired cache entry");
            let _ = tokio::fs::remove_file(&path).await;
            return Ok(None);
        }

        Ok(Some(entry.results))
    }

    async fn set(&self, signature: &str, query: &str, results: &[SearchResult]) -> Result<()> {
        self.write_entry(signature, query, results, Utc::now()).await
    }

    async fn clear(&self) -> Result<usize> {
        let mut count = 0;
        for path in self.entry_files().await? {
            tokio::fs::remove_file(&path).await?;
            count += 1;
        }
        Ok(count)
    }

    async fn clear_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut count = 0;
        for path in self.entry_files().await? {
            let stale = match Self::read_entry(&path).await {
                Some((entry, _)) => entry.is_expired(now),
                None => true,
            };
            if stale {
                tokio::fs::remove_file(&path).await?;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now();
        let mut stats = CacheStats {
            cache_dir: self.dir.display().to_string(),
            ..Default::default()
        };
        for path in self.entry_files().await? {
            stats.total += 1;
            match Self::read_entry(&path).await {
                Some((entry, size)) => {
                    stats.size_bytes += size;
                    if entry.is_expired(now) {
                        stats.expired += 1;
                    }
                }
                None => stats.expired += 1,
            }
        }
        stats.valid = stats.total - stats.expired;
        Ok(stats)
    }
}
