//! List workflow: walk a section index page by page and append new stubs to the ledger.
//!
//! A stub is collected when it passes the optional cutoff (published strictly
//! before it, or without a publish timestamp at all) and its id is not yet in
//! the ledger. Collection stops at the end of the index, after the page
//! limit's last page, or immediately when the article limit is reached.
//!
//! Fetch errors are not caught. Everything appended before the failure stays
//! in the ledger, and the next run resumes by skipping those ids.

use super::Harvester;
use crate::api::NewsApi;
use crate::error::Result;
use crate::models::{ArticleStub, Category};
use crate::storage::ledger::{self, LedgerWriter};
use crate::utils::parse_datetime;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Upper bound on a list run. Pages and articles cannot be combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Stop after this many pages have been processed.
    Pages(u32),
    /// Stop as soon as this many new stubs have been collected.
    Articles(u64),
}

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub category: Category,
    pub limit: Option<Limit>,
    /// Exclude stubs published at or after this instant.
    pub before: Option<DateTime<Utc>>,
    /// Delete the ledger before starting.
    pub rescrape: bool,
}

/// Why a list run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    PageLimit(u32),
    ArticleLimit(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    pub category: Category,
    /// Stubs appended to the ledger during this run.
    pub new_articles: u64,
    /// `totalPage` as reported by the first page.
    pub total_pages: u32,
    /// `total` as reported by the first page, 0 when absent.
    pub total_articles: u64,
    /// Section pages actually requested.
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// What happened to a single stub.
#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    Collect(i64),
    AfterCutoff,
    Known,
    NoId,
}

fn judge(stub: &ArticleStub, before: Option<DateTime<Utc>>, known: &HashSet<i64>) -> Verdict {
    if let Some(cutoff) = before {
        if !published_before(stub, cutoff) {
            return Verdict::AfterCutoff;
        }
    }
    match stub.id() {
        None => Verdict::NoId,
        Some(id) if known.contains(&id) => Verdict::Known,
        Some(id) => Verdict::Collect(id),
    }
}

/// True unless the stub carries a timestamp at or after `cutoff`.
///
/// Missing and empty timestamps always pass. So do timestamps no supported
/// layout can read; those are logged.
fn published_before(stub: &ArticleStub, cutoff: DateTime<Utc>) -> bool {
    let Some(raw) = stub.publish_time() else {
        return true;
    };
    match parse_datetime(raw) {
        Some(published) => published < cutoff,
        None => {
            warn!(id = ?stub.id(), publish_time = raw, "Unreadable publishTime; not filtering by date");
            true
        }
    }
}

impl<A: NewsApi> Harvester<A> {
    /// Collect new stubs for `options.category` into its ledger.
    ///
    /// # Arguments
    ///
    /// * `options` - Category, optional page or article limit, cutoff and rescrape flag
    ///
    /// # Returns
    ///
    /// A [`ListSummary`] with the counts and the reason the walk stopped.
    /// Any fetch or write error aborts the run; stubs already appended stay
    /// in the ledger.
    #[instrument(level = "info", skip_all, fields(category = %options.category))]
    pub async fn list(&self, options: &ListOptions) -> Result<ListSummary> {
        let category = options.category;
        let paths = self.paths(category);

        if options.rescrape && ledger::delete(&paths.ledger).await? {
            info!(path = %paths.ledger.display(), "Deleted existing ledger");
        }

        let mut known = ledger::load_existing_ids(&paths.ledger).await?;
        debug!(known = known.len(), "Loaded known article ids");

        info!("Fetching page 1");
        let first = self.api.section_page(category, 1).await?;
        let total_pages = first.totalPage;
        let total_articles = first.total.unwrap_or(0);
        info!(
            total_articles,
            total_pages, "Category '{category}': {total_articles} articles across {total_pages} pages"
        );

        let mut writer = LedgerWriter::open(&paths.ledger).await?;
        let mut first = Some(first);
        let mut pages_fetched = 1;
        let mut new_articles: u64 = 0;
        let mut stop = StopReason::Exhausted;

        'pages: for page_no in 1..=total_pages {
            let page = match first.take() {
                Some(page) => page,
                None => {
                    sleep(self.delay).await;
                    pages_fetched += 1;
                    self.api.section_page(category, page_no).await?
                }
            };

            let mut collected_on_page = 0;
            for stub in &page.items {
                match judge(stub, options.before, &known) {
                    Verdict::Collect(id) => {
                        writer.append(stub).await?;
                        known.insert(id);
                        new_articles += 1;
                        collected_on_page += 1;
                    }
                    Verdict::NoId => {
                        warn!(page = page_no, "Stub without a usable id; skipping");
                        continue;
                    }
                    Verdict::AfterCutoff | Verdict::Known => continue,
                }

                if let Some(Limit::Articles(max)) = options.limit {
                    if new_articles >= max {
                        info!("Reached article limit ({max}). Stopping.");
                        stop = StopReason::ArticleLimit(max);
                        break 'pages;
                    }
                }
            }

            info!(
                page = page_no,
                total_pages,
                items = page.items.len(),
                collected = collected_on_page,
                "Processed page"
            );

            if let Some(Limit::Pages(max)) = options.limit {
                if page_no >= max {
                    info!("Reached page limit ({max}). Stopping.");
                    stop = StopReason::PageLimit(max);
                    break;
                }
            }
        }

        info!(
            new_articles,
            pages_fetched,
            ledger = %writer.path().display(),
            "Collected {new_articles} new articles for '{category}'"
        );

        Ok(ListSummary {
            category,
            new_articles,
            total_pages,
            total_articles,
            pages_fetched,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CategoryPaths;
    use crate::workflows::testing::{FakeApi, config_for, stub};
    use chrono::TimeZone;
    use serde_json::{Value, json};
    use std::path::Path;

    fn options(limit: Option<Limit>) -> ListOptions {
        ListOptions {
            category: Category::Politics,
            limit,
            before: None,
            rescrape: false,
        }
    }

    fn three_pages() -> Vec<Vec<Value>> {
        vec![
            vec![stub(1, "2025-03-06T10:00:00"), stub(2, "2025-03-05T10:00:00")],
            vec![stub(3, "2025-03-04T10:00:00"), stub(4, "2025-03-03T10:00:00")],
            vec![stub(5, "2025-03-02T10:00:00"), stub(6, "2025-03-01T10:00:00")],
        ]
    }

    fn ledger_ids(data_dir: &Path) -> Vec<i64> {
        let path = CategoryPaths::new(data_dir, Category::Politics).ledger;
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_judge_cutoff_and_dedup_are_independent() {
        let cutoff = Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap();
        let known = HashSet::from([2]);
        let s = |v: Value| serde_json::from_value::<ArticleStub>(v).unwrap();

        assert_eq!(judge(&s(stub(1, "2025-03-04T10:00:00")), Some(cutoff), &known), Verdict::AfterCutoff);
        assert_eq!(judge(&s(stub(1, "2025-03-04T09:59:59")), Some(cutoff), &known), Verdict::Collect(1));
        assert_eq!(judge(&s(stub(2, "2025-01-01")), Some(cutoff), &known), Verdict::Known);
        assert_eq!(judge(&s(stub(3, "")), Some(cutoff), &known), Verdict::Collect(3));
        assert_eq!(judge(&s(json!({"id": 4})), Some(cutoff), &known), Verdict::Collect(4));
        assert_eq!(judge(&s(stub(5, "2030-01-01")), None, &known), Verdict::Collect(5));
        assert_eq!(judge(&s(json!({"title": "x"})), None, &known), Verdict::NoId);
    }

    #[test]
    fn test_offset_timestamps_compare_in_utc() {
        // 16:30 at +07:00 is 09:30 UTC, before a 10:00 UTC cutoff.
        let cutoff = Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap();
        let s: ArticleStub = serde_json::from_value(stub(1, "2025-03-04T16:30:00+07:00")).unwrap();
        assert!(published_before(&s, cutoff));
    }

    #[tokio::test]
    async fn test_collects_everything_without_limits() {
        let dir = tempfile::tempdir().unwrap();
        let harvester = Harvester::new(FakeApi::with_pages(three_pages()), &config_for(dir.path()));

        let summary = harvester.list(&options(None)).await.unwrap();

        assert_eq!(summary.new_articles, 6);
        assert_eq!(summary.total_pages, 3);
        assert_eq!(summary.total_articles, 6);
        assert_eq!(summary.stop, StopReason::Exhausted);
        assert_eq!(harvester.api.page_calls(), vec![1, 2, 3]);
        assert_eq!(ledger_ids(dir.path()), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_article_limit_stops_mid_page() {
        let dir = tempfile::tempdir().unwrap();
        let harvester = Harvester::new(FakeApi::with_pages(three_pages()), &config_for(dir.path()));

        let summary = harvester
            .list(&options(Some(Limit::Articles(5))))
            .await
            .unwrap();

        assert_eq!(summary.new_articles, 5);
        assert_eq!(summary.stop, StopReason::ArticleLimit(5));
        assert_eq!(summary.pages_fetched, 3);
        assert_eq!(harvester.api.page_calls(), vec![1, 2, 3]);
        assert_eq!(ledger_ids(dir.path()), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_page_limit_finishes_page_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let harvester = Harvester::new(FakeApi::with_pages(three_pages()), &config_for(dir.path()));

        let summary = harvester.list(&options(Some(Limit::Pages(2)))).await.unwrap();

        assert_eq!(summary.new_articles, 4);
        assert_eq!(summary.stop, StopReason::PageLimit(2));
        assert_eq!(harvester.api.page_calls(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_second_run_collects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let harvester = Harvester::new(FakeApi::with_pages(three_pages()), &config_for(dir.path()));

        assert_eq!(harvester.list(&options(None)).await.unwrap().new_articles, 6);
        assert_eq!(harvester.list(&options(None)).await.unwrap().new_articles, 0);
        assert_eq!(ledger_ids(dir.path()).len(), 6);
    }

    #[tokio::test]
    async fn test_resumed_run_never_duplicates_ids() {
        let dir = tempfile::tempdir().unwrap();
        let harvester = Harvester::new(FakeApi::with_pages(three_pages()), &config_for(dir.path()));

        harvester.list(&options(Some(Limit::Articles(3)))).await.unwrap();
        let summary = harvester.list(&options(None)).await.unwrap();

        assert_eq!(summary.new_articles, 3);
        assert_eq!(ledger_ids(dir.path()), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_cutoff_excludes_on_or_after() {
        let dir = tempfile::tempdir().unwrap();
        let pages = vec![vec![
            stub(1, "2025-03-06T00:00:00Z"),
            stub(2, "2025-03-05"),
            stub(3, ""),
            stub(4, "2025-03-04 23:59:59"),
        ]];
        let harvester = Harvester::new(FakeApi::with_pages(pages), &config_for(dir.path()));
        let mut opts = options(None);
        opts.before = Some(Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap());

        let summary = harvester.list(&opts).await.unwrap();

        assert_eq!(summary.new_articles, 2);
        assert_eq!(ledger_ids(dir.path()), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_cutoff_applies_to_minute_precision_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let pages = vec![vec![
            stub(1, "2030-01-01T00:00+07:00"),
            stub(2, "2020-01-01"),
            stub(3, "2030-01-01T00:00Z"),
            stub(4, "20300101"),
        ]];
        let harvester = Harvester::new(FakeApi::with_pages(pages), &config_for(dir.path()));
        let mut opts = options(None);
        opts.before = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let summary = harvester.list(&opts).await.unwrap();

        assert_eq!(summary.new_articles, 1);
        assert_eq!(ledger_ids(dir.path()), vec![2]);
    }

    #[tokio::test]
    async fn test_filtered_stubs_do_not_count_toward_limit() {
        let dir = tempfile::tempdir().unwrap();
        let pages = vec![
            vec![stub(1, "2030-01-01"), stub(2, "2030-01-01")],
            vec![stub(3, "2020-01-01"), stub(4, "2020-01-01")],
        ];
        let harvester = Harvester::new(FakeApi::with_pages(pages), &config_for(dir.path()));
        let mut opts = options(Some(Limit::Articles(1)));
        opts.before = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let summary = harvester.list(&opts).await.unwrap();

        assert_eq!(summary.new_articles, 1);
        assert_eq!(ledger_ids(dir.path()), vec![3]);
    }

    #[tokio::test]
    async fn test_rescrape_rebuilds_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = CategoryPaths::new(dir.path(), Category::Politics).ledger;
        std::fs::create_dir_all(ledger.parent().unwrap()).unwrap();
        std::fs::write(&ledger, "{\"id\": 99, \"title\": \"stale\"}\n{\"id\": 1}\n").unwrap();

        let harvester = Harvester::new(FakeApi::with_pages(three_pages()), &config_for(dir.path()));
        let mut opts = options(None);
        opts.rescrape = true;

        let summary = harvester.list(&opts).await.unwrap();

        assert_eq!(summary.new_articles, 6);
        assert_eq!(ledger_ids(dir.path()), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_and_keeps_written_stubs() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_pages(three_pages()).without_page(2);
        let harvester = Harvester::new(api, &config_for(dir.path()));

        assert!(harvester.list(&options(None)).await.is_err());
        assert_eq!(harvester.api.page_calls(), vec![1, 2]);
        assert_eq!(ledger_ids(dir.path()), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_first_page_failure_creates_no_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::with_pages(three_pages()).without_page(1);
        let harvester = Harvester::new(api, &config_for(dir.path()));

        assert!(harvester.list(&options(None)).await.is_err());
        assert!(!CategoryPaths::new(dir.path(), Category::Politics).ledger.exists());
    }
}
