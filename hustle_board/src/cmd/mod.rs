pub mod parse;
pub mod refresh;
pub mod server;

use crate::config::HustleConfig;
use anyhow::{Context, Result};
use clap::ValueEnum;
use hustle_board_libs::{
    crawler::FireCrawlClient,
    store::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
    LeaderboardRefresher, RefreshSettings,
};
use std::{fmt, sync::Arc};

#[derive(Debug, ValueEnum, Clone)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreKind::Postgres => write!(f, "postgres"),
            StoreKind::Memory => write!(f, "memory"),
        }
    }
}

pub async fn open_store(kind: &StoreKind, config: &HustleConfig) -> Result<Arc<dyn DocumentStore>> {
    match kind {
        StoreKind::Postgres => {
            let database_url = config.database_url.as_deref().with_context(|| {
                let message = "DATABASE_URL must be configured.";
                tracing::error!(message);
                message
            })?;
            let store = PgDocumentStore::connect(database_url)
                .await
                .with_context(|| {
                    let message = "Failed to connect to the document database.";
                    tracing::error!(message);
                    message
                })?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            tracing::warn!("Documents are kept in memory and will be lost on exit.");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}

pub fn build_refresher(
    config: &HustleConfig,
    store: Arc<dyn DocumentStore>,
) -> Result<LeaderboardRefresher> {
    let crawler = FireCrawlClient::new(
        &config.firecrawl_api_url,
        &config.firecrawl_api_key,
        config.crawl_timeout,
    )
    .with_context(|| {
        let message = "couldn't create crawler client. check the value of FIRECRAWL_API_URL.";
        tracing::error!(message);
        message
    })?;
    let settings = RefreshSettings::new(&config.contest_list_url, &config.contest_base_url)
        .with_context(|| {
            let message = "VJUDGE_CONTEST_BASE_URL is not a valid url.";
            tracing::error!(message);
            message
        })?;

    Ok(LeaderboardRefresher::new(Arc::new(crawler), store, settings))
}
