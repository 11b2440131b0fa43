//! Outbound crawler that turns a web page into markdown.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Duration;

type Result<T> = std::result::Result<T, CrawlerError>;

#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("failed to request to crawler: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("invalid crawler url given: {0}")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("crawler failed to scrape {url}: {message}")]
    ScrapeFailed { url: String, message: String },
    #[error("crawler returned no markdown for {0}")]
    MissingMarkdown(String),
}

#[async_trait]
pub trait MarkdownCrawler: Send + Sync {
    /// Fetch `url` and return the page rendered as markdown.
    async fn scrape(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
}

impl ScrapeResponse {
    fn into_markdown(self, url: &str) -> Result<String> {
        if !self.success {
            return Err(CrawlerError::ScrapeFailed {
                url: url.to_string(),
                message: self.error.unwrap_or_else(|| String::from("unknown error")),
            });
        }

        self.data
            .and_then(|data| data.markdown)
            .ok_or_else(|| CrawlerError::MissingMarkdown(url.to_string()))
    }
}

/// Client of the FireCrawl scrape API.
pub struct FireCrawlClient {
    scrape_url: Url,
    api_key: String,
    client: Client,
}

impl FireCrawlClient {
    pub fn new(api_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let scrape_url = Url::parse(api_url)?.join("v1/scrape")?;
        let client = Client::builder().gzip(true).timeout(timeout).build()?;

        Ok(Self {
            scrape_url,
            api_key: String::from(api_key),
            client,
        })
    }
}

#[async_trait]
impl MarkdownCrawler for FireCrawlClient {
    async fn scrape(&self, url: &str) -> Result<String> {
        tracing::info!("Scrape {} as markdown", url);
        let res = self
            .client
            .post(self.scrape_url.clone())
            .bearer_auth(&self.api_key)
            .json(&ScrapeRequest {
                url,
                formats: ["markdown"],
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(CrawlerError::ScrapeFailed {
                url: url.to_string(),
                message: format!("unexpected status [{}] cause [{}]", status, body),
            });
        }

        let body: ScrapeResponse = res.json().await?;
        let markdown = body.into_markdown(url)?;
        tracing::info!("{} bytes of markdown retrieved from {}", markdown.len(), url);

        Ok(markdown)
    }
}
