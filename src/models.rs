//! Data models for the section index and the article records it returns.
//!
//! Upstream records are kept as opaque JSON objects. Only the handful of
//! fields the workflows act on are read:
//! - [`ArticleStub::id`] and [`ArticleStub::publish_time`] on each stub
//! - `items`, `totalPage` and `total` on the [`SectionPage`] envelope
//!
//! Everything else is written back to disk exactly as received, with the
//! original key order.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// News sections exposed by the `section-loadmore` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Category {
    Politics,
    Social,
    Foreign,
    Economy,
    Crime,
    Disaster,
    Region,
    Environment,
    Sport,
    Royal,
    Entertainment,
    Lifestyle,
    Tech,
}

impl Category {
    /// The slug used both as the `section` query parameter and the data directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Social => "social",
            Category::Foreign => "foreign",
            Category::Economy => "economy",
            Category::Crime => "crime",
            Category::Disaster => "disaster",
            Category::Region => "region",
            Category::Environment => "environment",
            Category::Sport => "sport",
            Category::Royal => "royal",
            Category::Entertainment => "entertainment",
            Category::Lifestyle => "lifestyle",
            Category::Tech => "tech",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lightweight article record from the section index.
///
/// Serializes transparently as the underlying JSON object, so a stub read
/// from the API and appended to the ledger is byte-for-byte the same record
/// modulo whitespace.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ArticleStub {
    fields: Map<String, Value>,
}

impl ArticleStub {
    /// The article identifier.
    ///
    /// The upstream is loose about typing, so `123`, `123.0` and `"123"` are
    /// all accepted. Anything else (missing, null, fractional, non-numeric
    /// text) yields `None`.
    pub fn id(&self) -> Option<i64> {
        match self.fields.get("id")? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The raw `publishTime` string, or `None` when missing, null or empty.
    pub fn publish_time(&self) -> Option<&str> {
        self.fields
            .get("publishTime")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// One page of the `section-loadmore` response envelope.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
pub struct SectionPage {
    /// Stubs on this page, in the order the API returned them.
    pub items: Vec<ArticleStub>,
    /// Number of pages the section currently spans.
    pub totalPage: u32,
    /// Number of articles in the section, when reported.
    #[serde(default)]
    pub total: Option<u64>,
}
