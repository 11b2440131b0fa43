use super::{DocumentStore, Precondition, Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local document store for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_one(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.documents.read().await.get(name).cloned())
    }

    async fn upsert(&self, name: &str, body: Value, precondition: Precondition) -> Result<()> {
        let mut documents = self.documents.write().await;
        if !precondition.holds(documents.get(name)) {
            tracing::warn!("precondition {:?} failed for document `{}`", precondition, name);
            return Err(StoreError::Conflict(name.to_string()));
        }
        documents.insert(name.to_string(), body);
        Ok(())
    }
}
