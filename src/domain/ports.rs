use super::holding::OwnershipBook;
use super::ledger::AccountBook;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// A whole persisted document: loaded in full, rewritten in full.
pub trait Document: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {}

impl Document for OwnershipBook {}
impl Document for AccountBook {}

/// Exclusive hold on one store, released when dropped.
pub struct StoreLock {
    _held: Box<dyn Send>,
}

impl StoreLock {
    pub fn new<T: Send + 'static>(held: T) -> Self {
        Self {
            _held: Box::new(held),
        }
    }
}

impl fmt::Debug for StoreLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreLock")
    }
}

/// Durable storage for one document.
///
/// Locking contract: a caller performing read-modify-write must hold the
/// [`StoreLock`] returned by [`DocumentStore::lock`] from before `load`
/// until after `save`. `lock` waits at most `timeout` and then fails with
/// `EngineError::Busy`. `load` returns an empty document when nothing has
/// been persisted yet, and `EngineError::CorruptStore` when something has
/// but cannot be parsed.
#[async_trait]
pub trait DocumentStore<D: Document>: Send + Sync {
    async fn lock(&self, timeout: Duration) -> Result<StoreLock>;
    async fn load(&self) -> Result<D>;
    async fn save(&self, document: &D) -> Result<()>;
    /// Human-readable location, used in diagnostics.
    fn location(&self) -> String;
}

pub type OwnershipStoreBox = Box<dyn DocumentStore<OwnershipBook>>;
pub type LedgerStoreBox = Box<dyn DocumentStore<AccountBook>>;
