//! Snapshot persistence for the latest 12-hour aggregation.
//!
//! [`SnapshotStore`] is the get/put/merge abstraction the service writes
//! through. [`JsonFileStore`] keeps the snapshot as a JSON file on disk and
//! [`MemoryStore`] keeps it in process.
//!
//! Merging is shallow and last-write-wins: keys in the update replace keys of
//! the same name, other keys are left alone, nothing is appended.

mod json_file;

pub use json_file::JsonFileStore;

use anyhow::{Result, anyhow};
use serde_json::{Map, Value};
use std::sync::Mutex;

/// A persisted snapshot: `time` plus one entry per field.
pub type Document = Map<String, Value>;

pub trait SnapshotStore: Send + Sync {
    /// Returns the current snapshot, or `None` if nothing was stored yet.
    fn get(&self) -> Result<Option<Document>>;

    /// Replaces the stored snapshot.
    fn put(&self, document: &Document) -> Result<()>;

    /// Overwrites the keys present in `update` and returns the stored result.
    fn merge(&self, update: Document) -> Result<Document> {
        let mut document = self.get()?.unwrap_or_default();
        document.extend(update);
        self.put(&document)?;
        Ok(document)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self) -> Result<Option<Document>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn put(&self, document: &Document) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        *guard = Some(document.clone());
        Ok(())
    }
}
