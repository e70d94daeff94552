//! Runtime configuration for the harvester.
//!
//! Every value has a default matching the public Thai PBS endpoint, so the
//! binary works without a config file. A YAML file passed with `--config`
//! may override any subset of the fields:
//!
//! ```yaml
//! base_url: https://onecms.thaipbs.or.th/api/news/api-v
//! request_delay_ms: 1000
//! user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0"
//! data_dir: data
//! ```

use crate::error::{Result, ScrapeError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://onecms.thaipbs.or.th/api/news/api-v";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScraperConfig {
    /// Base address every endpoint path is appended to.
    pub base_url: String,
    /// Pause between two consecutive API calls.
    pub request_delay_ms: u64,
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    /// Root of the `<category>/list.jsonl` and `<category>/content/` tree.
    pub data_dir: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl ScraperConfig {
    /// Load the config file at `path`, or fall back to defaults when no path is given.
    ///
    /// Missing fields in the file keep their default values.
    #[instrument(level = "debug")]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path).await?;
        let config = Self::from_yaml(&raw).map_err(|source| ScrapeError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
