use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Document, SnapshotStore};
use crate::output::to_indented_json;

/// Stores the snapshot as a JSON object in a single file.
///
/// The file is written with a 4-space indent. Writes go to a sibling `.tmp`
/// file first and are renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn get(&self) -> Result<Option<Document>> {
        let file_exists = self.path.exists();
        debug!(path = %self.path.display(), file_exists, "Reading snapshot");
        if !file_exists {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid JSON", self.path.display()))?;

        match value {
            Value::Object(map) => Ok(Some(map)),
            _ => bail!("{} does not hold a JSON object", self.path.display()),
        }
    }

    fn put(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, to_indented_json(document)?)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), keys = document.len(), "Snapshot written");
        Ok(())
    }
}
