use crate::domain::ports::{Document, DocumentStore, StoreLock};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// A thread-safe in-memory document store.
///
/// Uses `Arc<RwLock<D>>` for the document and a separate `Mutex<()>` gate
/// for the read-modify-write lock, so clones share both. Ideal for tests or
/// embedding where persistence is not required.
pub struct InMemoryStore<D> {
    name: String,
    document: Arc<RwLock<D>>,
    gate: Arc<Mutex<()>>,
}

impl<D: Document> InMemoryStore<D> {
    /// Creates a new, empty in-memory store.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_document(name, D::default())
    }

    /// Creates a store pre-populated with `document`.
    pub fn with_document(name: impl Into<String>, document: D) -> Self {
        Self {
            name: name.into(),
            document: Arc::new(RwLock::new(document)),
            gate: Arc::new(Mutex::new(())),
        }
    }
}

impl<D> Clone for InMemoryStore<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            document: Arc::clone(&self.document),
            gate: Arc::clone(&self.gate),
        }
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for InMemoryStore<D> {
    async fn lock(&self, timeout: Duration) -> Result<StoreLock> {
        let guard = tokio::time::timeout(timeout, Arc::clone(&self.gate).lock_owned())
            .await
            .map_err(|_| EngineError::Busy {
                store: self.name.clone(),
                waited: timeout,
            })?;
        Ok(StoreLock::new(guard))
    }

    async fn load(&self) -> Result<D> {
        let document = self.document.read().await;
        Ok(document.clone())
    }

    async fn save(&self, document: &D) -> Result<()> {
        let mut current = self.document.write().await;
        *current = document.clone();
        Ok(())
    }

    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }
}
