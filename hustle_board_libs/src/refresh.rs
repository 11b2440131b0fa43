//! The fetch, parse, merge and persist pipeline behind a leaderboard refresh.
//!
//! Every step is awaited in order: contest list, stored leaderboard, contest
//! standings, snapshot write, leaderboard write.

use crate::crawler::{CrawlerError, MarkdownCrawler};
use crate::leaderboard::{LatestResult, Leaderboard, MergeOutcome};
use crate::store::{DocumentStore, HustleRepository, StoreError};
use crate::vjudge::{latest_contest_id, parse_contest_data, parse_vjudge_contests};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

type Result<T> = std::result::Result<T, RefreshError>;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("contest id not found in the contest list")]
    NoContest,
    #[error("failed to crawl: {0}")]
    CrawlerError(#[from] CrawlerError),
    #[error("failed to access the store: {0}")]
    StoreError(#[from] StoreError),
    #[error("invalid contest url: {0}")]
    InvalidUrlError(#[from] url::ParseError),
}

impl RefreshError {
    /// True when another refresh saved the leaderboard between our read and write.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RefreshError::StoreError(StoreError::Conflict(_)))
    }
}

/// Where to find the contests to merge.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub contest_list_url: String,
    /// Contest pages live at `<contest_base_url><id>#rank`.
    pub contest_base_url: Url,
}

impl RefreshSettings {
    pub fn new(contest_list_url: &str, contest_base_url: &str) -> Result<Self> {
        let mut contest_base_url = Url::parse(contest_base_url)?;
        if !contest_base_url.path().ends_with('/') {
            let path = format!("{}/", contest_base_url.path());
            contest_base_url.set_path(&path);
        }

        Ok(Self {
            contest_list_url: String::from(contest_list_url),
            contest_base_url,
        })
    }

    pub fn contest_rank_url(&self, contest_id: &str) -> Result<Url> {
        let mut url = self.contest_base_url.join(contest_id.trim())?;
        url.set_fragment(Some("rank"));
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub latest_contest_id: String,
    pub latest_contest_title: String,
    pub latest_contest_begin_time: String,
    pub latest_contest_end_time: String,
    pub latest_contest_duration: String,
    pub latest_contest_status: String,
    pub last_contest_code: String,
    pub participants: usize,
    pub added: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    UpToDate { contest_id: String },
    Updated(RefreshSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HustleData {
    pub latest: Option<LatestResult>,
    pub leaderboard: Option<Leaderboard>,
}

pub struct LeaderboardRefresher {
    crawler: Arc<dyn MarkdownCrawler>,
    repository: HustleRepository<Arc<dyn DocumentStore>>,
    settings: RefreshSettings,
}

impl LeaderboardRefresher {
    pub fn new(
        crawler: Arc<dyn MarkdownCrawler>,
        store: Arc<dyn DocumentStore>,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            crawler,
            repository: HustleRepository::new(store),
            settings,
        }
    }

    /// Merge the newest contest into the cumulative leaderboard, unless it
    /// already is.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        tracing::info!("Start to refresh the leaderboard.");
        let list = self.crawler.scrape(&self.settings.contest_list_url).await?;
        let contests = parse_vjudge_contests(&list);
        tracing::info!("{} contests found in the contest list.", contests.len());

        let contest_id = latest_contest_id(&contests)
            .ok_or(RefreshError::NoContest)?
            .to_string();

        let mut leaderboard = self
            .repository
            .load_leaderboard()
            .await?
            .unwrap_or_default();
        let read_contest_code = leaderboard.last_contest_code.clone();

        if leaderboard.is_up_to_date(&contest_id) {
            tracing::info!("Leaderboard is already up-to-date with contest {}.", contest_id);
            return Ok(RefreshOutcome::UpToDate { contest_id });
        }

        let rank_url = self.settings.contest_rank_url(&contest_id)?;
        let standings = self.crawler.scrape(rank_url.as_str()).await?;
        let detail = parse_contest_data(&standings);
        if detail.participants.is_empty() {
            tracing::warn!("contest {} has no parsable participants", contest_id);
        }

        let results = detail.rankings();
        let now = Utc::now();

        self.repository
            .save_latest(&LatestResult {
                results: results.clone(),
                update_time: now,
            })
            .await?;

        let (added, updated) = match leaderboard.merge(&contest_id, &results, now) {
            MergeOutcome::Merged { added, updated } => (added, updated),
            MergeOutcome::UpToDate => (0, 0),
        };
        self.repository
            .save_leaderboard(&leaderboard, read_contest_code.as_deref())
            .await?;

        tracing::info!("Leaderboard successfully updated with contest {}.", contest_id);

        Ok(RefreshOutcome::Updated(RefreshSummary {
            latest_contest_id: contest_id.clone(),
            latest_contest_title: detail.title,
            latest_contest_begin_time: detail.begin_time,
            latest_contest_end_time: detail.end_time,
            latest_contest_duration: detail.duration,
            latest_contest_status: detail.status,
            last_contest_code: contest_id,
            participants: results.len(),
            added,
            updated,
        }))
    }

    /// Stored snapshot and leaderboard; `limit` keeps only the top entries.
    pub async fn fetch(&self, limit: Option<usize>) -> Result<HustleData> {
        let latest = self.repository.load_latest().await?;
        let mut leaderboard = self.repository.load_leaderboard().await?;
        if let (Some(leaderboard), Some(limit)) = (leaderboard.as_mut(), limit) {
            leaderboard.rankings.truncate(limit);
        }

        Ok(HustleData {
            latest,
            leaderboard,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::{MemoryDocumentStore, Precondition, LEADERBOARD_DOCUMENT};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    const LIST_URL: &str = "https://vjudge.net/contest#category=public&owner=Pbhustle";

    struct FakeCrawler {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeCrawler {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, page)| (url.to_string(), page.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MarkdownCrawler for FakeCrawler {
        async fn scrape(&self, url: &str) -> std::result::Result<String, CrawlerError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| CrawlerError::ScrapeFailed {
                    url: url.to_string(),
                    message: String::from("not found"),
                })
        }
    }

    fn contest_list(id: &str) -> String {
        format!(
            "| {} | Public | [PB Hustle](https://vjudge.net/contest/{}) | Ended | 2025-03-01 20:00:00 | 2:00:00 | [Pbhustle](u) |\n",
            id, id
        )
    }

    const STANDINGS: &str = "### PB Hustle\n\n**Begin:** 2025-03-01 20:00:00\n\n**End:** 2025-03-01 22:00:00\n\n2:00:00\n\nEnded\n\n- [Overview](https://vjudge.net/contest/7#overview)\n\n| 1 | [alice] | 3 | 1:00:00 | 0:10:00 |\n| 2 | [b\\\\ob] | 1 | 0:30:00 | (-1) |\n";

    fn refresher(crawler: Arc<FakeCrawler>, store: Arc<MemoryDocumentStore>) -> LeaderboardRefresher {
        let settings = RefreshSettings::new(LIST_URL, "https://vjudge.net/contest").unwrap();
        LeaderboardRefresher::new(crawler, store, settings)
    }

    #[test]
    fn contest_rank_url() {
        let settings = RefreshSettings::new(LIST_URL, "https://vjudge.net/contest/").unwrap();
        assert_eq!(
            settings.contest_rank_url("701245").unwrap().as_str(),
            "https://vjudge.net/contest/701245#rank"
        );
    }

    #[tokio::test]
    async fn refresh_then_up_to_date() {
        let list = contest_list("7");
        let crawler = Arc::new(FakeCrawler::new(&[
            (LIST_URL, &list),
            ("https://vjudge.net/contest/7#rank", STANDINGS),
        ]));
        let store = Arc::new(MemoryDocumentStore::new());
        let refresher = refresher(crawler.clone(), store.clone());

        let summary = match refresher.refresh().await.unwrap() {
            RefreshOutcome::Updated(summary) => summary,
            outcome => panic!("expected an update, got {:?}", outcome),
        };
        assert_eq!(summary.latest_contest_id, "7");
        assert_eq!(summary.latest_contest_title, "PB Hustle");
        assert_eq!(summary.latest_contest_duration, "2:00:00");
        assert_eq!(summary.latest_contest_status, "Ended");
        assert_eq!(summary.participants, 2);

        let data = refresher.fetch(None).await.unwrap();
        let leaderboard = data.leaderboard.unwrap();
        assert_eq!(leaderboard.last_contest_code.as_deref(), Some("7"));
        let names: Vec<&str> = leaderboard.rankings.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(data.latest.unwrap().results.len(), 2);

        assert_eq!(
            refresher.refresh().await.unwrap(),
            RefreshOutcome::UpToDate {
                contest_id: String::from("7")
            }
        );
        // The standings page is not fetched again once the contest is merged.
        assert_eq!(crawler.requests().len(), 3);

        let again = refresher.fetch(None).await.unwrap().leaderboard.unwrap();
        assert_eq!(again, leaderboard);
    }

    #[tokio::test]
    async fn fetch_with_limit() {
        let list = contest_list("7");
        let crawler = Arc::new(FakeCrawler::new(&[
            (LIST_URL, &list),
            ("https://vjudge.net/contest/7#rank", STANDINGS),
        ]));
        let refresher = refresher(crawler, Arc::new(MemoryDocumentStore::new()));

        assert_eq!(refresher.fetch(Some(1)).await.unwrap(), HustleData::default());

        refresher.refresh().await.unwrap();
        let leaderboard = refresher.fetch(Some(1)).await.unwrap().leaderboard.unwrap();
        assert_eq!(leaderboard.rankings.len(), 1);
        assert_eq!(leaderboard.rankings[0].name, "alice");
    }

    #[tokio::test]
    async fn empty_contest_list() {
        let crawler = Arc::new(FakeCrawler::new(&[(LIST_URL, "# no contests")]));
        let refresher = refresher(crawler, Arc::new(MemoryDocumentStore::new()));

        assert!(matches!(
            refresher.refresh().await,
            Err(RefreshError::NoContest)
        ));
    }

    #[tokio::test]
    async fn crawler_failure_surfaces() {
        let crawler = Arc::new(FakeCrawler::new(&[]));
        let store = Arc::new(MemoryDocumentStore::new());
        let refresher = refresher(crawler, store.clone());

        assert!(matches!(
            refresher.refresh().await,
            Err(RefreshError::CrawlerError(_))
        ));
        assert_eq!(refresher.fetch(None).await.unwrap(), HustleData::default());
    }

    /// Store that lets a competing refresh save right after the leaderboard is read.
    struct RacingStore {
        inner: MemoryDocumentStore,
        raced: AtomicBool,
    }

    #[async_trait]
    impl DocumentStore for RacingStore {
        async fn find_one(&self, name: &str) -> crate::store::Result<Option<Value>> {
            let document = self.inner.find_one(name).await?;
            if name == LEADERBOARD_DOCUMENT && !self.raced.swap(true, Ordering::SeqCst) {
                self.inner
                    .upsert(
                        name,
                        json!({"rankings": [], "lastContestCode": "7"}),
                        Precondition::None,
                    )
                    .await?;
            }
            Ok(document)
        }

        async fn upsert(
            &self,
            name: &str,
            body: Value,
            precondition: Precondition,
        ) -> crate::store::Result<()> {
            self.inner.upsert(name, body, precondition).await
        }
    }

    #[tokio::test]
    async fn concurrent_merge_is_rejected() {
        let list = contest_list("7");
        let crawler = Arc::new(FakeCrawler::new(&[
            (LIST_URL, &list),
            ("https://vjudge.net/contest/7#rank", STANDINGS),
        ]));
        let store = Arc::new(RacingStore {
            inner: MemoryDocumentStore::new(),
            raced: AtomicBool::new(false),
        });
        let settings = RefreshSettings::new(LIST_URL, "https://vjudge.net/contest/").unwrap();
        let refresher = LeaderboardRefresher::new(crawler, store.clone(), settings);

        let error = refresher.refresh().await.unwrap_err();
        assert!(error.is_conflict());

        let leaderboard = store.inner.find_one(LEADERBOARD_DOCUMENT).await.unwrap();
        assert_eq!(
            leaderboard,
            Some(json!({"rankings": [], "lastContestCode": "7"}))
        );
    }
}
