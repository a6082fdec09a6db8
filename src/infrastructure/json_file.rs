use crate::domain::holding::OwnershipBook;
use crate::domain::ledger::AccountBook;
use crate::domain::ports::{Document, DocumentStore, StoreLock};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use serde_json::ser::PrettyFormatter;
use std::fs::{File, OpenOptions, TryLockError};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::debug;

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A document persisted as a single pretty-printed JSON file.
///
/// Writes go to a temporary file in the same directory which is fsynced
/// and renamed over the target, so readers only ever see a complete
/// document. The read-modify-write lock is an advisory lock on a sibling
/// `<file>.lock`, which also serializes separate processes sharing the
/// data directory.
pub struct JsonFileStore<D> {
    path: PathBuf,
    indent: &'static [u8],
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> JsonFileStore<D> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            indent: b"  ",
            _document: PhantomData,
        }
    }

    pub fn with_indent(mut self, indent: &'static [u8]) -> Self {
        self.indent = indent;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn encode(&self, document: &D) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(self.indent));
        document.serialize(&mut serializer)?;
        buffer.push(b'\n');
        Ok(buffer)
    }
}

/// Ownership registry file, indented with two spaces.
pub fn ownership_store(path: impl Into<PathBuf>) -> JsonFileStore<OwnershipBook> {
    JsonFileStore::new(path)
}

/// Account ledger file, indented with four spaces.
pub fn ledger_store(path: impl Into<PathBuf>) -> JsonFileStore<AccountBook> {
    JsonFileStore::new(path).with_indent(b"    ")
}

#[async_trait]
impl<D: Document> DocumentStore<D> for JsonFileStore<D> {
    async fn lock(&self, timeout: Duration) -> Result<StoreLock> {
        std::fs::create_dir_all(self.directory())?;
        let file: File = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;

        let started = Instant::now();
        loop {
            match file.try_lock() {
                Ok(()) => {
                    debug!(store = %self.path.display(), "lock acquired");
                    return Ok(StoreLock::new(file));
                }
                Err(TryLockError::WouldBlock) => {
                    if started.elapsed() >= timeout {
                        return Err(EngineError::Busy {
                            store: self.location(),
                            waited: timeout,
                        });
                    }
                    tokio::time::sleep(LOCK_POLL_INTERVAL).await;
                }
                Err(TryLockError::Error(e)) => return Err(e.into()),
            }
        }
    }

    async fn load(&self) -> Result<D> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                debug!(store = %self.path.display(), bytes = bytes.len(), "loaded");
                serde_json::from_slice(&bytes).map_err(|source| EngineError::CorruptStore {
                    store: self.location(),
                    source,
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(store = %self.path.display(), "not found, starting empty");
                Ok(D::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, document: &D) -> Result<()> {
        let buffer = self.encode(document)?;
        let directory = self.directory();
        std::fs::create_dir_all(directory)?;

        let mut staged = NamedTempFile::new_in(directory)?;
        staged.write_all(&buffer)?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .map_err(|e| EngineError::Io(e.error))?;

        debug!(store = %self.path.display(), bytes = buffer.len(), "saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
