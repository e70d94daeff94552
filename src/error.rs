//! Error type shared by the API client, the storage layer and the workflows.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while harvesting a section.
///
/// Transport failures (connection errors and non-2xx responses alike) surface
/// as [`ScrapeError::Http`]. The list workflow lets them propagate; the
/// content workflow logs them per article and moves on.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
