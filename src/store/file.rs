//! File-backed store: one directory per session key, one JSON file per document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{Document, Store};
use crate::{Result, SyncError};

/// Stores documents as `<root>/<sanitized key>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| SyncError::file_error(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, key: &str) -> PathBuf {
        self.root.join(Self::sanitize_key(key))
    }

    fn document_path(&self, key: &str, name: &str) -> PathBuf {
        self.collection_dir(key).join(format!("{}.json", Self::sanitize_key(name)))
    }

    /// Keep keys readable while making them safe as a single path component.
    ///
    /// Alphanumerics, `@`, `#` and `-` are kept; every other byte, `_`
    /// included, becomes `_` plus two hex digits. The mapping is injective, so
    /// two keys never share a directory.
    fn sanitize_key(key: &str) -> String {
        if key.is_empty() {
            return "_".to_string();
        }

        let mut sanitized = String::with_capacity(key.len());
        for c in key.chars() {
            if c.is_alphanumeric() || matches!(c, '@' | '#' | '-') {
                sanitized.push(c);
            } else {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    sanitized.push_str(&format!("_{byte:02X}"));
                }
            }
        }
        sanitized
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get_document(&self, key: &str, name: &str) -> Result<Option<Document>> {
        let path = self.document_path(key, name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SyncError::store_with_source(key, format!("Unable to read {name}"), Box::new(e)));
            }
        };

        let document = serde_json::from_str(&content).map_err(|e| {
            SyncError::store_with_source(key, format!("Corrupted document {}", path.display()), Box::new(e))
        })?;
        Ok(Some(document))
    }

    async fn put_document(&self, key: &str, name: &str, document: Document) -> Result<()> {
        let dir = self.collection_dir(key);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| SyncError::store_with_source(key, "Unable to create collection", Box::new(e)))?;

        let path = self.document_path(key, name);
        let content = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| SyncError::store_with_source(key, format!("Unable to write {name}"), Box::new(e)))?;

        debug!(path = %path.display(), "Document written");
        Ok(())
    }

    async fn clear_collection(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_dir_all(self.collection_dir(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::store_with_source(key, "Unable to clear collection", Box::new(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{INFO_DOCUMENT, STATE_DOCUMENT};
    use serde_json::json;
    use tempfile::TempDir;

    const KEY: &str = "Night Owls@1000#2000#0";

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.put_document(KEY, STATE_DOCUMENT, json!({ "lap": 12, "pitState": "ENTERED" })).await.unwrap();

        let reopened = FileStore::new(dir.path()).unwrap();
        let doc = reopened.get_document(KEY, STATE_DOCUMENT).await.unwrap();
        assert_eq!(doc, Some(json!({ "lap": 12, "pitState": "ENTERED" })));
        assert!(dir.path().join("Night_20Owls@1000#2000#0").join("State.json").exists());
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_eq!(store.get_document(KEY, INFO_DOCUMENT).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_removes_collection() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.put_document(KEY, STATE_DOCUMENT, json!({})).await.unwrap();
        store.put_document(KEY, INFO_DOCUMENT, json!({})).await.unwrap();
        store.put_document("other", STATE_DOCUMENT, json!({})).await.unwrap();

        store.clear_collection(KEY).await.unwrap();
        store.clear_collection(KEY).await.unwrap();

        assert_eq!(store.get_document(KEY, STATE_DOCUMENT).await.unwrap(), None);
        assert!(store.get_document("other", STATE_DOCUMENT).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupted_document_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let collection = dir.path().join("k");
        std::fs::create_dir_all(&collection).unwrap();
        std::fs::write(collection.join("State.json"), "{ not json").unwrap();

        let err = store.get_document("k", STATE_DOCUMENT).await.unwrap_err();
        assert!(matches!(err, SyncError::Store { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn keys_cannot_escape_root() {
        assert_eq!(FileStore::sanitize_key("../../etc"), "_2E_2E_2F_2E_2E_2Fetc");
        assert_eq!(FileStore::sanitize_key("a/b\\c"), "a_2Fb_5Cc");
        assert_eq!(FileStore::sanitize_key(""), "_");
    }

    #[test]
    fn similar_keys_map_to_distinct_directories() {
        assert_ne!(
            FileStore::sanitize_key("Night Owls@car#spa#0"),
            FileStore::sanitize_key("Night_Owls@car#spa#0")
        );
        assert_ne!(FileStore::sanitize_key("a_2F"), FileStore::sanitize_key("a/"));
    }

    #[tokio::test]
    async fn clearing_one_key_keeps_a_lookalike() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.put_document("Night Owls@car#spa#0", STATE_DOCUMENT, json!({ "lap": 1 })).await.unwrap();
        store.put_document("Night_Owls@car#spa#0", STATE_DOCUMENT, json!({ "lap": 2 })).await.unwrap();

        store.clear_collection("Night Owls@car#spa#0").await.unwrap();

        assert_eq!(store.get_document("Night Owls@car#spa#0", STATE_DOCUMENT).await.unwrap(), None);
        let kept = store.get_document("Night_Owls@car#spa#0", STATE_DOCUMENT).await.unwrap();
        assert_eq!(kept, Some(json!({ "lap": 2 })));
    }
}
