//! The concurrent cache store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};
use crate::io::{load_records, write_record};
use crate::key::{CacheEntry, CacheKey};
use crate::refresh::{RefreshKey, TimedRecord};

const RECORDS_DIR: &str = "records";
const REFRESHABLE_DIR: &str = "refreshable";

/// Result of a [`CacheStore::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The entry was recorded.
    Stored,
    /// The key already held a committed entry, which was left untouched.
    Kept,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: CacheKey,
    entry: CacheEntry,
    stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
struct Stamped {
    entry: CacheEntry,
    stored_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTimed {
    key: RefreshKey,
    record: TimedRecord,
}

/// Durable key-value cache shared by all in-flight fetches.
///
/// Reads and writes hold the in-memory lock only for the map operation.
/// Disk writes are serialized separately and skipped when memory already
/// holds a newer value for the key, so the file always ends up matching
/// memory. A committed entry ([`CacheEntry::is_committed`]) is never
/// replaced.
#[derive(Debug)]
pub struct CacheStore {
    root: Option<PathBuf>,
    entries: RwLock<HashMap<CacheKey, Stamped>>,
    refreshable: RwLock<HashMap<RefreshKey, TimedRecord>>,
    disk: Mutex<()>,
    write_seq: AtomicU64,
}

impl CacheStore {
    /// Open a store backed by `root`, loading every readable record.
    ///
    /// Never fails: a missing directory or corrupt files degrade to misses.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        let mut entries = HashMap::new();
        for (name, stored) in load_records::<StoredEntry>(&root.join(RECORDS_DIR)) {
            if stored.key.storage_name() != name {
                tracing::warn!("Skipping cache file {name}: contents belong to another key");
                continue;
            }
            entries.insert(
                stored.key,
                Stamped {
                    entry: stored.entry,
                    stored_at: stored.stored_at,
                },
            );
        }

        let mut refreshable = HashMap::new();
        for (name, stored) in load_records::<StoredTimed>(&root.join(REFRESHABLE_DIR)) {
            if stored.key.storage_name() != name {
                tracing::warn!("Skipping cache file {name}: contents belong to another key");
                continue;
            }
            refreshable.insert(stored.key, stored.record);
        }

        tracing::info!(
            "Opened cache at {} ({} records, {} refreshable)",
            root.display(),
            entries.len(),
            refreshable.len()
        );

        Self {
            root: Some(root),
            entries: RwLock::new(entries),
            refreshable: RwLock::new(refreshable),
            disk: Mutex::new(()),
            write_seq: AtomicU64::new(0),
        }
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            root: None,
            entries: RwLock::new(HashMap::new()),
            refreshable: RwLock::new(HashMap::new()),
            disk: Mutex::new(()),
            write_seq: AtomicU64::new(0),
        }
    }

    /// Backing directory, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.read_entries().get(key).map(|stamped| stamped.entry.clone())
    }

    /// Like [`get`](Self::get), but a [`CacheEntry::Absent`] older than
    /// `absent_ttl` reads as a miss so the caller asks again.
    pub fn get_current(&self, key: &CacheKey, absent_ttl: Duration) -> Option<CacheEntry> {
        let entries = self.read_entries();
        let stamped = entries.get(key)?;
        if stamped.entry.is_committed() {
            return Some(stamped.entry.clone());
        }
        let expires_at = TimeDelta::from_std(absent_ttl)
            .ok()
            .and_then(|ttl| stamped.stored_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (Utc::now() < expires_at).then(|| stamped.entry.clone())
    }

    /// Record `entry` under `key` unless a committed entry is already there.
    ///
    /// Re-recording a non-committed entry restamps it. On a disk error the
    /// entry stays in memory for this process and the error is returned for
    /// logging.
    pub fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<PutOutcome> {
        let stamped = Stamped {
            entry,
            stored_at: Utc::now(),
        };
        {
            let mut entries = self.write_entries();
            if entries.get(&key).is_some_and(|existing| existing.entry.is_committed()) {
                tracing::debug!(?key, "Cache already holds this key, keeping it");
                return Ok(PutOutcome::Kept);
            }
            entries.insert(key.clone(), stamped.clone());
        }

        if let Some(root) = &self.root {
            let _disk = self.lock_disk();
            if self.read_entries().get(&key) != Some(&stamped) {
                tracing::debug!(?key, "Newer entry already recorded, skipping write");
                return Ok(PutOutcome::Stored);
            }
            let path = root.join(RECORDS_DIR).join(key.storage_name());
            let stored = StoredEntry {
                key,
                entry: stamped.entry,
                stored_at: stamped.stored_at,
            };
            write_record(&path, &stored, self.next_seq())?;
        }

        Ok(PutOutcome::Stored)
    }

    /// Number of historical entries.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a refreshable value that has not yet expired.
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &RefreshKey) -> Option<T> {
        let now = Utc::now();
        let guard = self
            .refreshable
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let record = guard.get(key).filter(|record| record.is_fresh_at(now))?;
        serde_json::from_value(record.value.clone()).ok()
    }

    /// Read a refreshable value regardless of its expiry.
    ///
    /// Used as a last resort when the service cannot be reached.
    pub fn get_stale<T: DeserializeOwned>(&self, key: &RefreshKey) -> Option<T> {
        let guard = self
            .refreshable
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let record = guard.get(key)?;
        serde_json::from_value(record.value.clone()).ok()
    }

    /// Store a refreshable value that expires after `ttl`.
    pub fn put_refreshable<T: Serialize>(
        &self,
        key: RefreshKey,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let value =
            serde_json::to_value(value).map_err(|e| CacheError::Serialization { source: e })?;
        let stored_at = Utc::now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| stored_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let record = TimedRecord {
            value,
            stored_at,
            expires_at,
        };

        self.refreshable
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), record.clone());

        if let Some(root) = &self.root {
            let _disk = self.lock_disk();
            let latest = self
                .refreshable
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&key)
                .is_some_and(|current| *current == record);
            if !latest {
                return Ok(());
            }
            let path = root.join(REFRESHABLE_DIR).join(key.storage_name());
            write_record(&path, &StoredTimed { key, record }, self.next_seq())?;
        }
        Ok(())
    }

    fn next_seq(&self) -> u64 {
        self.write_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_disk(&self) -> MutexGuard<'_, ()> {
        self.disk.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Stamped>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Stamped>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
