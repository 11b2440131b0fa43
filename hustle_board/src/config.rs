use anyhow::{Context, Result};
use std::env;
use tokio::time::Duration;

const DEFAULT_FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev";
const DEFAULT_CONTEST_LIST_URL: &str =
    "https://vjudge.net/contest#category=public&running=0&title=&owner=Pbhustle";
const DEFAULT_CONTEST_BASE_URL: &str = "https://vjudge.net/contest/";
const DEFAULT_CRAWL_TIMEOUT_SECS: u64 = 60;

/// Settings read once from the environment and handed to each component.
#[derive(Debug, Clone)]
pub struct HustleConfig {
    pub database_url: Option<String>,
    pub firecrawl_api_url: String,
    pub firecrawl_api_key: String,
    pub crawl_timeout: Duration,
    pub contest_list_url: String,
    pub contest_base_url: String,
    pub frontend_origin_url: Option<String>,
}

impl HustleConfig {
    pub fn from_env() -> Result<Self> {
        let firecrawl_api_key = env::var("FIRECRAWL_API_KEY").with_context(|| {
            let message = "FIRECRAWL_API_KEY must be configured.";
            tracing::error!(message);
            message
        })?;

        let crawl_timeout = match env::var("CRAWL_TIMEOUT_SECS") {
            Ok(secs) => secs.parse::<u64>().with_context(|| {
                let message = format!("CRAWL_TIMEOUT_SECS must be an integer, got {:?}", secs);
                tracing::error!(message);
                message
            })?,
            Err(_) => DEFAULT_CRAWL_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            firecrawl_api_url: env_or("FIRECRAWL_API_URL", DEFAULT_FIRECRAWL_API_URL),
            firecrawl_api_key,
            crawl_timeout: Duration::from_secs(crawl_timeout),
            contest_list_url: env_or("VJUDGE_CONTEST_LIST_URL", DEFAULT_CONTEST_LIST_URL),
            contest_base_url: env_or("VJUDGE_CONTEST_BASE_URL", DEFAULT_CONTEST_BASE_URL),
            frontend_origin_url: env::var("FRONTEND_ORIGIN_URL").ok(),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::info!("{} is not set. Default value `{}` will be used.", key, default);
        String::from(default)
    })
}
