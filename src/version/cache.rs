//! URL-keyed, time-bounded on-disk cache for remote documents
//!
//! Each entry is a JSON file named after the hex SHA-256 of the source URL.
//! Writes go through a temporary file in the cache directory that is then
//! renamed over the entry, so concurrent readers never see a partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::CacheConfig;
use crate::version::error::CacheError;

/// Source of the current time, replaceable in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    url: String,
    fetched_at: DateTime<Utc>,
    payload: String,
}

pub struct VersionCache {
    dir: PathBuf,
    freshness: Duration,
    clock: Arc<dyn Clock>,
}

impl VersionCache {
    pub fn new(dir: &Path, freshness: Duration) -> Self {
        Self::with_clock(dir, freshness, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: &Path, freshness: Duration, clock: Arc<dyn Clock>) -> Self {
        info!("Using cache directory {:?}", dir);
        Self {
            dir: dir.to_path_buf(),
            freshness,
            clock,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(&config.dir, config.freshness)
    }

    /// Stable cache key for a source URL
    pub fn key_for(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key_for(url)))
    }

    /// Returns the cached payload for `url` if present and still fresh.
    ///
    /// Entries that cannot be decoded are reported as absent.
    pub fn get(&self, url: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(url);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Cache miss for {}", url);
                return Ok(None);
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Discarding unreadable cache entry {:?}: {}", path, e);
                return Ok(None);
            }
        };

        if entry.url != url {
            debug!("Cache key collision for {}; ignoring entry", url);
            return Ok(None);
        }

        if self.is_stale(entry.fetched_at) {
            debug!("Stale cache entry for {} ({})", url, entry.fetched_at);
            return Ok(None);
        }

        debug!("Cache hit for {}", url);
        Ok(Some(entry.payload))
    }

    /// Stores `payload` for `url`, replacing any existing entry atomically.
    pub fn put(&self, url: &str, payload: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let entry = CacheEntry {
            url: url.to_string(),
            fetched_at: self.clock.now(),
            payload: payload.to_string(),
        };
        let encoded = serde_json::to_vec(&entry)?;

        let path = self.entry_path(url);
        let io_err = |source| CacheError::Io {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(&encoded).map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;

        debug!("Cached {} bytes for {}", payload.len(), url);
        Ok(())
    }

    /// Removes the entry for `url`, if any.
    pub fn invalidate(&self, url: &str) -> Result<(), CacheError> {
        let path = self.entry_path(url);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn is_stale(&self, fetched_at: DateTime<Utc>) -> bool {
        let age = self.clock.now().signed_duration_since(fetched_at);
        match age.to_std() {
            Ok(age) => age > self.freshness,
            // Written "in the future" (clock skew): keep it
            Err(_) => false,
        }
    }
}
