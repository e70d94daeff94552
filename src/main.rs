//! # Thai PBS News Harvester
//!
//! Incrementally harvests articles from the Thai PBS content API, one
//! section (category) at a time.
//!
//! ## Usage
//!
//! ```sh
//! scrape list politics --pages 2
//! scrape list economy --articles 10 --before 2026-01-01
//! scrape content politics
//! ```
//!
//! ## Architecture
//!
//! Two independent workflows share one API client and one on-disk layout:
//! 1. **List**: page through a section index and append unseen stubs to
//!    `data/<category>/list.jsonl`
//! 2. **Content**: fetch `data/<category>/content/<id>.json` for every stub
//!    that does not have one yet
//!
//! Everything runs sequentially with a fixed pause between requests.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod storage;
mod utils;
mod workflows;

use api::ApiClient;
use cli::{Cli, Command};
use config::ScraperConfig;
use storage::CategoryPaths;
use workflows::{Harvester, StopReason};

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();

    // Parse CLI before anything touches the network or the filesystem
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = ScraperConfig::load(args.config.as_deref()).await?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    info!(
        base_url = %config.base_url,
        data_dir = %config.data_dir.display(),
        request_delay_ms = config.request_delay_ms,
        "Configuration ready"
    );

    let api = ApiClient::new(&config)?;
    let harvester = Harvester::new(api, &config);

    match args.command {
        Command::List(list_args) => {
            let summary = harvester.list(&list_args.options()).await?;
            match summary.stop {
                StopReason::ArticleLimit(max) => println!("Reached article limit ({max}). Stopping."),
                StopReason::PageLimit(max) => println!("Reached page limit ({max}). Stopping."),
                StopReason::Exhausted => {}
            }
            println!(
                "Done. Collected {} new articles for '{}' ({} of {} pages fetched, {} articles listed upstream).",
                summary.new_articles,
                summary.category,
                summary.pages_fetched,
                summary.total_pages,
                summary.total_articles
            );
        }
        Command::Content(content_args) => {
            let category = content_args.category;
            let Some(plan) = harvester.plan_content(&content_args.options()).await? else {
                eprintln!(
                    "Error: {} not found. Run 'scrape list {category}' first.",
                    CategoryPaths::new(&config.data_dir, category).ledger.display()
                );
                return Ok(());
            };
            if plan.removed() > 0 {
                println!("Deleted {} existing content files.", plan.removed());
            }
            println!(
                "Content: {}/{} articles pending download.",
                plan.pending().len(),
                plan.total()
            );
            let summary = harvester.download_pending(plan).await;
            println!(
                "Done. Downloaded {}/{}, failed {} ({} stubs in the '{}' ledger). Content saved to {}",
                summary.downloaded,
                summary.pending,
                summary.failed,
                summary.total,
                summary.category,
                summary.content_dir.display()
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
