//! The per-category stub ledger (`list.jsonl`).
//!
//! One JSON object per line, UTF-8, non-Latin text left unescaped. The file
//! is only ever appended to; ids are deduplicated before a line is written,
//! so every id appears at most once.
//!
//! Reading is forgiving: blank lines, lines that are not a JSON object, and
//! (for [`load_existing_ids`]) objects without an integer `id` are skipped
//! without complaint.

use crate::error::Result;
use crate::models::ArticleStub;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Parse one ledger line. `None` means "skip this line".
pub fn parse_line(line: &str) -> Option<ArticleStub> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line).ok()
}

/// Every parseable stub in the ledger, in file order. A missing file is an empty ledger.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn load_stubs(path: &Path) -> Result<Vec<ArticleStub>> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let stubs: Vec<ArticleStub> = raw.lines().filter_map(parse_line).collect();
    debug!(count = stubs.len(), "Loaded ledger stubs");
    Ok(stubs)
}

/// The set of ids already recorded in the ledger.
pub async fn load_existing_ids(path: &Path) -> Result<HashSet<i64>> {
    Ok(load_stubs(path)
        .await?
        .iter()
        .filter_map(ArticleStub::id)
        .collect())
}

/// Remove the ledger. Returns `false` when there was nothing to remove.
pub async fn delete(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Append handle held for the duration of one list run.
#[derive(Debug)]
pub struct LedgerWriter {
    file: File,
    path: PathBuf,
}

impl LedgerWriter {
    /// Open `path` for appending, creating it and its parent directories if needed.
    ///
    /// # Arguments
    ///
    /// * `path` - Ledger file, usually `data/<category>/list.jsonl`
    ///
    /// # Returns
    ///
    /// A writer positioned at the end of the file, or an error if the
    /// directories cannot be created or the file cannot be opened.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Write `stub` as a single line.
    ///
    /// The line is flushed before returning, so an error later in the run
    /// never loses a stub that was already reported as collected.
    pub async fn append(&mut self, stub: &ArticleStub) -> Result<()> {
        let mut line = serde_json::to_string(stub)?;
        line.push('\n');
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
