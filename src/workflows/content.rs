//! Content workflow: download the full record for every ledger stub not yet on disk.
//!
//! Failures are isolated per article. A bad id is logged and the batch moves
//! on; the missing `<id>.json` keeps it pending for the next run.

use super::Harvester;
use crate::api::NewsApi;
use crate::error::Result;
use crate::models::{ArticleStub, Category};
use crate::storage::content::ContentStore;
use crate::storage::ledger;
use futures::future;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::path::PathBuf;
use tokio::fs;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub category: Category,
    /// Delete every content record for the category before starting.
    pub rescrape: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSummary {
    pub category: Category,
    pub content_dir: PathBuf,
    /// Stubs read from the ledger.
    pub total: usize,
    /// Stubs that had no content record when the run started.
    pub pending: usize,
    pub downloaded: usize,
    pub failed: usize,
}

/// Ids left to download, worked out before any request is made.
#[derive(Debug, Clone)]
pub struct ContentPlan {
    category: Category,
    store: ContentStore,
    total: usize,
    pending: Vec<i64>,
    removed: usize,
}

impl ContentPlan {
    /// Stubs read from the ledger.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Stubs without a content record, in ledger order.
    pub fn pending(&self) -> &[i64] {
        &self.pending
    }

    /// Records deleted by a rescrape.
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl<A: NewsApi> Harvester<A> {
    /// Read the ledger and work out which ids still need a content record.
    ///
    /// No API request is made here. On rescrape the existing records are
    /// deleted first, so every stub is pending.
    ///
    /// # Arguments
    ///
    /// * `options` - Category to plan for and whether to clear its content first
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the category has no ledger yet, otherwise the plan.
    /// Filesystem errors while reading the ledger or clearing records are
    /// returned as is.
    #[instrument(level = "info", skip_all, fields(category = %options.category))]
    pub async fn plan_content(&self, options: &ContentOptions) -> Result<Option<ContentPlan>> {
        let category = options.category;
        let paths = self.paths(category);

        if !fs::try_exists(&paths.ledger).await? {
            error!(path = %paths.ledger.display(), "Ledger not found; run the list command first");
            return Ok(None);
        }

        let store = ContentStore::new(&paths.content_dir);
        let removed = if options.rescrape {
            let removed = store.clear().await?;
            info!(removed, dir = %store.dir().display(), "Deleted {removed} existing content files");
            removed
        } else {
            0
        };

        let stubs = ledger::load_stubs(&paths.ledger).await?;
        let total = stubs.len();
        let pending = pending_ids(&store, &stubs).await?;
        let count = pending.len();
        info!(pending = count, total, "Content: {count}/{total} articles pending download");

        Ok(Some(ContentPlan {
            category,
            store,
            total,
            pending,
            removed,
        }))
    }

    /// Fetch and store every id in `plan`, one at a time.
    ///
    /// A failed id is logged and counted; it never stops the batch.
    #[instrument(level = "info", skip_all, fields(category = %plan.category))]
    pub async fn download_pending(&self, plan: ContentPlan) -> ContentSummary {
        let ContentPlan {
            category,
            store,
            total,
            pending,
            ..
        } = plan;
        let count = pending.len();

        let store = &store;
        let downloaded = stream::iter(pending.into_iter().enumerate())
            .then(|(i, id)| async move {
                let ok = match self.download(store, id).await {
                    Ok(path) => {
                        info!(id, progress = i + 1, of = count, path = %path.display(), "Downloaded content");
                        true
                    }
                    Err(e) => {
                        error!(id, progress = i + 1, of = count, error = %e, "Error fetching article {id}");
                        false
                    }
                };
                sleep(self.delay).await;
                ok
            })
            .fold(0, |done, ok| future::ready(done + usize::from(ok)))
            .await;

        let failed = count - downloaded;
        info!(
            downloaded,
            failed,
            dir = %store.dir().display(),
            "Content saved"
        );

        ContentSummary {
            category,
            content_dir: store.dir().to_path_buf(),
            total,
            pending: count,
            downloaded,
            failed,
        }
    }

    async fn download(&self, store: &ContentStore, id: i64) -> Result<PathBuf> {
        let content = self.api.content(id).await?;
        store.write(id, &content).await
    }
}

/// Ids in ledger order whose content record does not exist yet.
///
/// An id listed twice in a hand-edited ledger is only fetched once.
async fn pending_ids(store: &ContentStore, stubs: &[ArticleStub]) -> Result<Vec<i64>> {
    let without_id = stubs.iter().filter(|s| s.id().is_none()).count();
    if without_id > 0 {
        warn!(count = without_id, "Ledger stubs without a usable id; skipping them");
    }

    let mut pending = Vec::new();
    for id in stubs.iter().filter_map(ArticleStub::id).unique() {
        if !store.exists(id).await? {
            pending.push(id);
        }
    }
    Ok(pending)
}
