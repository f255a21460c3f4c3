//! Persistence of per-session documents.
//!
//! Documents are grouped in collections named by the session key. Two
//! documents are used per collection: [`INFO_DOCUMENT`] (the session info
//! payload, written on session change) and [`STATE_DOCUMENT`] (the serialized
//! [`SyncState`](crate::state::SyncState)).
//!
//! Store failures are never fatal; the caller logs them and carries on.

mod file;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Result, SyncError};

pub use file::FileStore;

/// Name of the document holding the synchronized state.
pub const STATE_DOCUMENT: &str = "State";

/// Name of the document holding the session info payload.
pub const INFO_DOCUMENT: &str = "Info";

/// A stored document.
pub type Document = serde_json::Value;

/// Capability to load and save documents per session key.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load a document, `None` when it was never written.
    async fn get_document(&self, key: &str, name: &str) -> Result<Option<Document>>;

    /// Create or replace a document.
    async fn put_document(&self, key: &str, name: &str, document: Document) -> Result<()>;

    /// Remove every document stored under `key`.
    async fn clear_collection(&self, key: &str) -> Result<()>;
}

/// Process-lifetime store, used when no state directory is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, HashMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous read for inspection outside the tick loop.
    pub fn document(&self, key: &str, name: &str) -> Option<Document> {
        let collections = self.collections.lock().ok()?;
        collections.get(key)?.get(name).cloned()
    }

    /// Session keys that currently hold documents.
    pub fn keys(&self) -> Vec<String> {
        self.collections.lock().map(|c| c.keys().cloned().collect()).unwrap_or_default()
    }

    fn lock(
        &self,
        key: &str,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, HashMap<String, Document>>>> {
        self.collections.lock().map_err(|_| SyncError::store(key, "memory store lock poisoned"))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_document(&self, key: &str, name: &str) -> Result<Option<Document>> {
        let collections = self.lock(key)?;
        Ok(collections.get(key).and_then(|docs| docs.get(name)).cloned())
    }

    async fn put_document(&self, key: &str, name: &str, document: Document) -> Result<()> {
        let mut collections = self.lock(key)?;
        collections.entry(key.to_string()).or_default().insert(name.to_string(), document);
        Ok(())
    }

    async fn clear_collection(&self, key: &str) -> Result<()> {
        let mut collections = self.lock(key)?;
        collections.remove(key);
        Ok(())
    }
}
