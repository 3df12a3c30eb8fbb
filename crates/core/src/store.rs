//! Extraction history and its local storage slot.
//!
//! [`RecordStore`] keeps records most-recent-first. The history lives in a
//! single [`LocalStorage`] key as a JSON array and is read once when the
//! store is restored.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::record::{ExtractionRecord, Status, StoredRecord};
use crate::{Result, UrlsumError};

/// Storage key holding the serialized history.
pub const STORAGE_KEY: &str = "aicontent";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Directory-backed key-value storage. Each key is one `<key>.json` file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Reads a key. A missing file is `Ok(None)`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(UrlsumError::Storage { path, source }),
        }
    }

    pub fn backup_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.bak", key))
    }

    /// Writes a key through a temp file and rename.
    ///
    /// The temp name is unique per process and per call, so concurrent
    /// writers never share one; the last rename wins.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| UrlsumError::Storage { path: self.dir.clone(), source })?;

        let path = self.path_for(key);
        let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!(".{}.json.{}.{}.tmp", key, std::process::id(), seq));
        fs::write(&tmp, value).map_err(|source| UrlsumError::Storage { path: tmp.clone(), source })?;
        fs::rename(&tmp, &path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            UrlsumError::Storage { path, source }
        })
    }

    /// Copies a key to `<key>.json.bak`, replacing any earlier backup.
    pub fn backup(&self, key: &str) -> Result<PathBuf> {
        let backup = self.backup_path_for(key);
        fs::copy(self.path_for(key), &backup).map_err(|source| UrlsumError::Storage { path: backup.clone(), source })?;
        Ok(backup)
    }

    /// Deletes a key. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(UrlsumError::Storage { path, source }),
        }
    }
}

/// When the store writes itself back to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Save after every new record.
    #[default]
    OnWrite,
    /// Restore at startup only; new records live for the session.
    ReadOnly,
}

/// Per-status totals over the whole history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub success: usize,
    pub error: usize,
}

/// Ordered extraction history, most recent first.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<ExtractionRecord>,
    storage: Option<LocalStorage>,
}

impl RecordStore {
    /// An empty in-memory store with no backing storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores history from `storage`.
    ///
    /// Missing or unreadable history yields an empty store; the problem is
    /// logged rather than returned. Entries without a `status` are successes,
    /// entries with contradictory fields are normalized, and entries that
    /// cannot be read at all are skipped.
    ///
    /// Whenever something from the stored copy is dropped, the file is first
    /// copied to `<key>.json.bak`. If that copy or the read itself fails the
    /// store is detached from storage, so a later save cannot overwrite
    /// history that was never loaded.
    pub fn restore(storage: LocalStorage) -> Self {
        let raw = match storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self { records: Vec::new(), storage: Some(storage) },
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored history, starting empty without saving");
                return Self { records: Vec::new(), storage: None };
            }
        };

        let (records, dropped) = parse_history(&raw, &storage.path_for(STORAGE_KEY));
        tracing::debug!(count = records.len(), "restored extraction history");

        if !dropped {
            return Self { records, storage: Some(storage) };
        }

        match storage.backup(STORAGE_KEY) {
            Ok(backup) => {
                tracing::warn!(backup = %backup.display(), "kept a copy of the stored history before it is rewritten");
                Self { records, storage: Some(storage) }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not back up stored history, new records will not be saved");
                Self { records, storage: None }
            }
        }
    }

    /// Builds a store from records already in most-recent-first order.
    pub fn from_records(records: Vec<ExtractionRecord>) -> Self {
        Self { records, storage: None }
    }

    pub fn storage(&self) -> Option<&LocalStorage> {
        self.storage.as_ref()
    }

    pub fn records(&self) -> &[ExtractionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn head(&self) -> Option<&ExtractionRecord> {
        self.records.first()
    }

    /// Inserts a record at the head.
    pub fn prepend(&mut self, record: ExtractionRecord) {
        self.records.insert(0, record);
    }

    pub fn counts(&self) -> StatusCounts {
        self.records.iter().fold(StatusCounts::default(), |mut acc, r| {
            match r.status {
                Status::Success => acc.success += 1,
                Status::Error => acc.error += 1,
            }
            acc
        })
    }

    /// Writes the whole history to storage. A store without storage does nothing.
    pub fn save(&self) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };

        let json = serde_json::to_string(&self.records)?;
        storage.set(STORAGE_KEY, &json)?;
        tracing::debug!(count = self.records.len(), "saved extraction history");
        Ok(())
    }

    /// Drops every record and removes the stored copy.
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        if let Some(storage) = &self.storage {
            storage.remove(STORAGE_KEY)?;
        }
        Ok(())
    }
}

/// Parses a stored history array one entry at a time.
///
/// Returns the readable records and whether anything was dropped.
fn parse_history(raw: &str, path: &Path) -> (Vec<ExtractionRecord>, bool) {
    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "stored history is malformed, starting empty");
            return (Vec::new(), true);
        }
    };

    let mut dropped = false;
    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StoredRecord>(entry) {
            Ok(stored) => {
                let (record, changed) = stored.normalize();
                if changed {
                    tracing::warn!(index, url = %record.url, "normalized inconsistent stored record");
                }
                records.push(record);
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable stored record");
                dropped = true;
            }
        }
    }
    (records, dropped)
}
