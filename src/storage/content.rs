//! Per-article content records (`content/<id>.json`).
//!
//! The existence of `<id>.json` is the only marker that an article has been
//! downloaded; there is no separate index.

use crate::error::Result;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        Ok(fs::try_exists(self.path_for(id)).await?)
    }

    /// Write `content` pretty-printed to `<id>.json`, replacing any previous record.
    ///
    /// # Arguments
    ///
    /// * `id` - Article id, used as the file stem
    /// * `content` - The record exactly as the content endpoint returned it
    ///
    /// # Returns
    ///
    /// The path written, or an error if directory creation, serialization or
    /// the write itself fails.
    pub async fn write(&self, id: i64, content: &Value) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(id);
        let json = serde_json::to_string_pretty(content)?;
        fs::write(&path, json).await?;
        Ok(path)
    }

    /// Delete every `*.json` record. Returns how many files were removed.
    #[instrument(level = "debug", skip_all, fields(dir = %self.dir.display()))]
    pub async fn clear(&self) -> Result<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path.extension().is_some_and(|ext| ext == "json")
                && entry.file_type().await?.is_file();
            if is_record {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        debug!(removed, "Cleared content records");
        Ok(removed)
    }
}
