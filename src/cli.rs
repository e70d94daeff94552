//! Command-line interface definitions for the harvester.
//!
//! Two subcommands, one per workflow. The config file and data directory can
//! also be supplied through environment variables.

use crate::models::Category;
use crate::utils::parse_cutoff;
use crate::workflows::{ContentOptions, Limit, ListOptions};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for `scrape`.
///
/// # Examples
///
/// ```sh
/// scrape list politics --pages 2
/// scrape list economy --articles 10 --before 2026-01-01
/// scrape content politics
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "scrape",
    author,
    version,
    about = "Thai PBS news scraper",
    after_help = "examples:\n  scrape list politics --pages 2\n  scrape list economy --articles 10 --before 2026-01-01\n  scrape content politics"
)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true, env = "SCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory for ledgers and content (overrides the config file)
    #[arg(long, global = true, env = "SCRAPE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the article list for a category
    List(ListArgs),
    /// Download full article content for a category
    Content(ContentArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Category slug
    #[arg(value_enum)]
    pub category: Category,

    /// Max pages to fetch
    #[arg(long, value_name = "N", conflicts_with = "articles", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: Option<u32>,

    /// Max articles to collect
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub articles: Option<u64>,

    /// Only include articles published before DATE (ISO 8601 or YYYY-MM-DD, treated as UTC if no timezone)
    #[arg(long, value_name = "DATE", value_parser = parse_cutoff)]
    pub before: Option<DateTime<Utc>>,

    /// Delete existing list and re-scrape from scratch
    #[arg(long)]
    pub rescrape: bool,
}

impl ListArgs {
    pub fn options(&self) -> ListOptions {
        let limit = match (self.pages, self.articles) {
            (Some(pages), _) => Some(Limit::Pages(pages)),
            (None, Some(articles)) => Some(Limit::Articles(articles)),
            (None, None) => None,
        };
        ListOptions {
            category: self.category,
            limit,
            before: self.before,
            rescrape: self.rescrape,
        }
    }
}

#[derive(Args, Debug)]
pub struct ContentArgs {
    /// Category slug
    #[arg(value_enum)]
    pub category: Category,

    /// Delete existing content and re-download everything
    #[arg(long)]
    pub rescrape: bool,
}

impl ContentArgs {
    pub fn options(&self) -> ContentOptions {
        ContentOptions {
            category: self.category,
            rescrape: self.rescrape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_parsing() {
        let cli = Cli::parse_from([
            "scrape", "list", "economy", "--articles", "10", "--before", "2026-01-01",
        ]);

        let Command::List(args) = cli.command else {
            panic!("expected list subcommand");
        };
        let options = args.options();
        assert_eq!(options.category, Category::Economy);
        assert_eq!(options.limit, Some(Limit::Articles(10)));
        assert_eq!(
            options.before,
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(!options.rescrape);
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::parse_from(["scrape", "list", "tech"]);
        let Command::List(args) = cli.command else {
            panic!("expected list subcommand");
        };
        let options = args.options();
        assert_eq!(options.limit, None);
        assert_eq!(options.before, None);
    }

    #[test]
    fn test_pages_and_articles_conflict() {
        let err = Cli::try_parse_from(["scrape", "list", "politics", "--pages", "2", "--articles", "5"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = Cli::try_parse_from(["scrape", "content", "weather"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(Cli::try_parse_from(["scrape", "list", "politics", "--pages", "0"]).is_err());
        assert!(Cli::try_parse_from(["scrape", "list", "politics", "--articles", "0"]).is_err());
    }

    #[test]
    fn test_bad_before_rejected() {
        let err = Cli::try_parse_from(["scrape", "list", "politics", "--before", "whenever"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_content_with_global_flags() {
        let cli = Cli::parse_from([
            "scrape", "content", "royal", "--rescrape", "--data-dir", "/tmp/news",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/news")));
        let Command::Content(args) = cli.command else {
            panic!("expected content subcommand");
        };
        let options = args.options();
        assert_eq!(options.category, Category::Royal);
        assert!(options.rescrape);
    }
}
