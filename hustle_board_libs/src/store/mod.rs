//! Persistence of the `latest` and `leaderboard` documents.
//!
//! The engine behind [`DocumentStore`] only has to offer read-one-by-key and a
//! single-document atomic upsert with an optional precondition.

pub mod memory;
pub mod postgres;

use crate::leaderboard::{LatestResult, Leaderboard};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

pub const LATEST_DOCUMENT: &str = "latest";
pub const LEADERBOARD_DOCUMENT: &str = "leaderboard";

/// Field of the leaderboard document guarded by optimistic concurrency.
pub const LAST_CONTEST_CODE_FIELD: &str = "lastContestCode";

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("failed to run database migration: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("failed to (de)serialize document: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("document `{0}` was modified concurrently")]
    Conflict(String),
}

/// Condition the stored document must satisfy for an upsert to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    None,
    /// The top-level string `field` of the stored document equals `expected`.
    /// `None` means the field is absent, or the document does not exist yet.
    FieldEquals {
        field: String,
        expected: Option<String>,
    },
}

impl Precondition {
    pub fn holds(&self, current: Option<&Value>) -> bool {
        match self {
            Precondition::None => true,
            Precondition::FieldEquals { field, expected } => {
                let actual = current
                    .and_then(|document| document.get(field))
                    .and_then(Value::as_str);
                actual == expected.as_deref()
            }
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, name: &str) -> Result<Option<Value>>;
    /// Insert or replace the document. Fails with [`StoreError::Conflict`] when
    /// the precondition does not hold.
    async fn upsert(&self, name: &str, body: Value, precondition: Precondition) -> Result<()>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn find_one(&self, name: &str) -> Result<Option<Value>> {
        (**self).find_one(name).await
    }

    async fn upsert(&self, name: &str, body: Value, precondition: Precondition) -> Result<()> {
        (**self).upsert(name, body, precondition).await
    }
}

/// Typed access to the two documents of the hustle leaderboard.
pub struct HustleRepository<S> {
    store: S,
}

impl<S: DocumentStore> HustleRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn load_latest(&self) -> Result<Option<LatestResult>> {
        self.load(LATEST_DOCUMENT).await
    }

    pub async fn load_leaderboard(&self) -> Result<Option<Leaderboard>> {
        self.load(LEADERBOARD_DOCUMENT).await
    }

    pub async fn save_latest(&self, latest: &LatestResult) -> Result<()> {
        self.save(LATEST_DOCUMENT, latest, Precondition::None).await
    }

    /// Save the leaderboard only if nobody moved `lastContestCode` away from
    /// `read_contest_code` since it was read.
    pub async fn save_leaderboard(
        &self,
        leaderboard: &Leaderboard,
        read_contest_code: Option<&str>,
    ) -> Result<()> {
        let precondition = Precondition::FieldEquals {
            field: String::from(LAST_CONTEST_CODE_FIELD),
            expected: read_contest_code.map(String::from),
        };
        self.save(LEADERBOARD_DOCUMENT, leaderboard, precondition)
            .await
    }

    async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.store.find_one(name).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    async fn save<T: Serialize + Sync>(
        &self,
        name: &str,
        document: &T,
        precondition: Precondition,
    ) -> Result<()> {
        let body = serde_json::to_value(document)?;
        self.store.upsert(name, body, precondition).await?;
        tracing::info!("document `{}` saved", name);
        Ok(())
    }
}
