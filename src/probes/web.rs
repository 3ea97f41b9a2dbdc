//! Gateway status page scrape

use super::ProbeCollector;
use crate::{
    error::Result,
    models::ProbeResult,
    parsers::{WebPageScraper, SCRAPE_SOURCE},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// Retrieves a page body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// `Ok(None)` when the server answered with anything other than 200
    async fn fetch(&self, url: &str) -> Result<Option<String>>;
}

pub struct HttpPageFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, timeout: crate::defaults::WEB_SCRAPE_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }
}

/// Scrapes whatever figures the device's status page exposes
pub struct WebInterfaceCollector {
    url: String,
    fetcher: Arc<dyn PageFetcher>,
    scraper: WebPageScraper,
}

impl WebInterfaceCollector {
    pub fn new(url: String, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self { url, fetcher, scraper: WebPageScraper::new()? })
    }
}

#[async_trait]
impl ProbeCollector for WebInterfaceCollector {
    fn name(&self) -> &'static str {
        SCRAPE_SOURCE
    }

    async fn collect(&self) -> Result<Option<ProbeResult>> {
        Ok(self.fetcher
            .fetch(&self.url)
            .await?
            .and_then(|body| self.scraper.scrape(&body)))
    }
}
