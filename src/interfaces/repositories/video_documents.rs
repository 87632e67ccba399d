use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;

use crate::errors::AppError;

/// Secondary record of uploaded videos, keyed by host identifier.
///
/// The relay keeps no metadata of its own; this collaborator is injected so a
/// deployment can plug in whatever document store mirrors the host.
#[async_trait]
pub trait VideoDocumentStore: Send + Sync {
    async fn delete_by_id(&self, public_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStoreKind {
    #[default]
    Noop,
    Memory,
}

/// Used when no document store is configured.
#[derive(Debug, Clone, Default)]
pub struct NoopVideoDocumentStore;

#[async_trait]
impl VideoDocumentStore for NoopVideoDocumentStore {
    async fn delete_by_id(&self, public_id: &str) -> Result<(), AppError> {
        tracing::debug!(public_id, "No document store configured, nothing to delete");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryVideoDocumentStore {
    documents: DashMap<String, serde_json::Value>,
}

impl InMemoryVideoDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, public_id: impl Into<String>, document: serde_json::Value) {
        self.documents.insert(public_id.into(), document);
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.documents.contains_key(public_id)
    }
}

#[async_trait]
impl VideoDocumentStore for InMemoryVideoDocumentStore {
    async fn delete_by_id(&self, public_id: &str) -> Result<(), AppError> {
        if self.documents.remove(public_id).is_none() {
            tracing::debug!(public_id, "No document mirrored for video");
        }
        Ok(())
    }
}
