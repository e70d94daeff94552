//! On-disk layout for harvested data.
//!
//! ```text
//! data_dir/
//! └── politics/
//!     ├── list.jsonl        # ledger: one article stub per line
//!     └── content/
//!         ├── 1001.json     # full content record, pretty-printed
//!         └── 1002.json
//! ```
//!
//! # Submodules
//!
//! - [`ledger`]: append-only stub ledger and the known-id set built from it
//! - [`content`]: per-article content records

pub mod content;
pub mod ledger;

use crate::models::Category;
use std::path::{Path, PathBuf};

pub const LEDGER_FILE_NAME: &str = "list.jsonl";
pub const CONTENT_DIR_NAME: &str = "content";

/// Paths owned by a single category under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPaths {
    pub ledger: PathBuf,
    pub content_dir: PathBuf,
}

impl CategoryPaths {
    pub fn new(data_dir: &Path, category: Category) -> Self {
        let root = data_dir.join(category.as_str());
        Self {
            ledger: root.join(LEDGER_FILE_NAME),
            content_dir: root.join(CONTENT_DIR_NAME),
        }
    }
}
