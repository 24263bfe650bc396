// src/utils/http.rs

//! HTTP client utilities and the page-fetching seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Source of document content for a URL.
///
/// Implementations return the page as it would be seen after any client-side
/// rendering has settled. A page whose listing rows or elevation text are
/// filled in by script needs a rendering implementation; [`HttpFetcher`]
/// does not run scripts.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetches pages over HTTP and returns the raw response body.
///
/// Only suitable for server-rendered pages: no script runs, so content the
/// site injects client-side is absent and extraction sees empty rows or no
/// elevation text.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::with_client(create_async_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(url, e))?;
        let text = response.text().await.map_err(|e| AppError::fetch(url, e))?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_from_default_config() {
        assert!(create_async_client(&CrawlerConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_fetch_error() {
        let config = CrawlerConfig {
            timeout_secs: 1,
            ..CrawlerConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();

        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }
}
