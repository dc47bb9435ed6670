//! Local (guest) history store
//!
//! A `LocalStore` is a single slot holding a JSON array of records, like a
//! browser storage key. `BoundedHistory` keeps it to the most recent
//! `capacity` entries and swallows every failure.

use crate::error::PersistenceError;
use crate::record::SessionRecord;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default number of records kept locally
pub const DEFAULT_CAPACITY: usize = 20;

/// One-slot record storage
pub trait LocalStore: Send + Sync + Debug {
    /// Read all records. A missing slot reads as empty.
    ///
    /// # Errors
    /// Implementation-defined read or decode failure
    fn read(&self) -> Result<Vec<SessionRecord>, PersistenceError>;

    /// Replace the slot contents
    ///
    /// # Errors
    /// Implementation-defined write or quota failure
    fn write(&self, records: &[SessionRecord]) -> Result<(), PersistenceError>;
}

/// Records in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `path`; the file is created on first write
    #[inline]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalStore for JsonFileStore {
    fn read(&self) -> Result<Vec<SessionRecord>, PersistenceError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, records: &[SessionRecord]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(records)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

/// In-process slot with an optional byte quota
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Mutex<Option<String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Empty, unlimited store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store refusing writes larger than `limit` bytes
    #[inline]
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            raw: Mutex::new(None),
            quota_bytes: Some(limit),
        }
    }

    /// Store pre-filled with raw slot content (possibly invalid JSON)
    #[inline]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            quota_bytes: None,
        }
    }

    /// Raw slot content
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().clone()
    }
}

impl LocalStore for MemoryStore {
    fn read(&self) -> Result<Vec<SessionRecord>, PersistenceError> {
        match self.raw.lock().as_deref() {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write(&self, records: &[SessionRecord]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(records)?;
        if let Some(limit) = self.quota_bytes {
            if raw.len() > limit {
                return Err(PersistenceError::QuotaExceeded {
                    needed: raw.len(),
                    limit,
                });
            }
        }
        *self.raw.lock() = Some(raw);
        Ok(())
    }
}

/// FIFO-capped, best-effort view over a `LocalStore`
#[derive(Debug)]
pub struct BoundedHistory {
    store: Box<dyn LocalStore>,
    capacity: usize,
}

impl BoundedHistory {
    /// Wrap `store`, keeping at most `capacity` records
    pub fn new(store: impl LocalStore + 'static, capacity: usize) -> Self {
        Self {
            store: Box::new(store),
            capacity,
        }
    }

    /// All records, oldest first. Unreadable content reads as empty.
    #[must_use]
    pub fn load(&self) -> Vec<SessionRecord> {
        self.store.read().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "local history unreadable, starting empty");
            Vec::new()
        })
    }

    /// Replace contents with the last `capacity` of `records`
    pub fn save_all(&self, records: &[SessionRecord]) {
        let start = records.len().saturating_sub(self.capacity);
        if let Err(err) = self.store.write(&records[start..]) {
            tracing::warn!(error = %err, "local history write failed, ignoring");
        }
    }

    /// Append one record, evicting the oldest beyond capacity
    pub fn append(&self, record: SessionRecord) {
        let mut records = self.load();
        records.push(record);
        self.save_all(&records);
    }

    /// Maximum records kept
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> SessionRecord {
        SessionRecord::new(format!("Company {n}"), vec![])
    }

    #[test]
    fn append_keeps_most_recent() {
        let history = BoundedHistory::new(MemoryStore::new(), 3);
        for n in 0..5 {
            history.append(record(n));
        }
        let companies: Vec<_> = history.load().into_iter().map(|r| r.company).collect();
        assert_eq!(companies, vec!["Company 2", "Company 3", "Company 4"]);
    }

    #[test]
    fn corrupt_slot_reads_empty() {
        let history = BoundedHistory::new(MemoryStore::with_raw("{not json"), DEFAULT_CAPACITY);
        assert!(history.load().is_empty());

        history.append(record(1));
        assert_eq!(history.load().len(), 1);
    }

    #[test]
    fn quota_failure_is_swallowed() {
        let history = BoundedHistory::new(MemoryStore::with_quota(8), DEFAULT_CAPACITY);
        history.append(record(1));
        assert!(history.load().is_empty());
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("history.json"));
        assert!(store.read().unwrap().is_empty());

        let records = vec![record(1), record(2)];
        store.write(&records).unwrap();
        assert_eq!(store.read().unwrap(), records);
    }
}
