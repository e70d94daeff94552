//! HTTP access to the Thai PBS content API.
//!
//! # Architecture
//!
//! - [`NewsApi`]: the seam the workflows depend on. Only [`NewsApi::fetch`]
//!   must be implemented; the typed endpoint helpers are provided.
//! - [`ApiClient`]: the `reqwest`-backed implementation used by the binary.
//!
//! No retries happen here. A non-2xx status becomes an error and is handed
//! straight back to the caller, which decides whether it is fatal.

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::models::{Category, SectionPage};
use reqwest::Client;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

pub const SECTION_ENDPOINT: &str = "section-loadmore";
pub const CONTENT_ENDPOINT: &str = "content";

/// Read-only access to the two endpoints the harvester uses.
pub trait NewsApi {
    /// GET `endpoint` with `params` as the query string and parse the body as JSON.
    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value>;

    /// Fetch one page (1-based) of a section index.
    async fn section_page(&self, category: Category, page: u32) -> Result<SectionPage> {
        let params = [
            ("section", category.as_str().to_string()),
            ("page", page.to_string()),
        ];
        let value = self.fetch(SECTION_ENDPOINT, &params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch the full content record of one article.
    async fn content(&self, id: i64) -> Result<Value> {
        self.fetch(CONTENT_ENDPOINT, &[("id", id.to_string())]).await
    }
}

/// `reqwest` client bound to a base URL, sending a fixed `User-Agent`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        // Url::join replaces the last path segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint)?)
    }
}

impl NewsApi for ApiClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint_url(endpoint)?;
        let t0 = Instant::now();

        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        let response = response.error_for_status().inspect_err(|e| {
            warn!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "API request failed");
        })?;

        let value = response.json::<Value>().await?;
        debug!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "API request succeeded");
        Ok(value)
    }
}
