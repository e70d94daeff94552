//! The two harvesting workflows.
//!
//! Both run strictly sequentially against a single category and share the
//! same fixed pause between API calls:
//!
//! | Workflow | Module | Reads | Writes |
//! |----------|--------|-------|--------|
//! | List | [`list`] | section index, ledger | ledger (append) |
//! | Content | [`content`] | ledger, content dir | content dir |
//!
//! Rerunning either one is the retry mechanism: the list workflow skips ids
//! already in the ledger and the content workflow skips ids that already
//! have a record on disk.

pub mod content;
pub mod list;

use crate::api::NewsApi;
use crate::config::ScraperConfig;
use crate::models::Category;
use crate::storage::CategoryPaths;
use std::path::PathBuf;
use std::time::Duration;

pub use content::ContentOptions;
pub use list::{Limit, ListOptions, StopReason};

/// Runs the workflows with an API client and the on-disk layout fixed at construction.
#[derive(Debug)]
pub struct Harvester<A> {
    api: A,
    data_dir: PathBuf,
    delay: Duration,
}

impl<A: NewsApi> Harvester<A> {
    pub fn new(api: A, config: &ScraperConfig) -> Self {
        Self {
            api,
            data_dir: config.data_dir.clone(),
            delay: config.request_delay(),
        }
    }

    fn paths(&self, category: Category) -> CategoryPaths {
        CategoryPaths::new(&self.data_dir, category)
    }
}
