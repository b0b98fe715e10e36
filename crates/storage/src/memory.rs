//! In-memory storage backend for tests and credential-free local runs.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{object_key, ObjectStore, StorageError, StoredObject};

const BACKEND_NAME: &str = "Memory";

/// [`ObjectStore`] over a process-local map. Nothing survives a restart
/// and URLs use a `memory://` scheme that only tests resolve.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` currently holds an object.
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let key = object_key(filename);
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.clone(), bytes);
        let url = format!("memory://{key}");
        Ok(StoredObject { key, url })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        // Removing an absent key is a no-op, matching the contract.
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_delete_round_trip() {
        let store = MemoryStore::new();
        let stored = store
            .upload(vec![1, 2, 3], "1-0.png", "image/png")
            .await
            .unwrap();
        assert!(store.contains(&stored.key));
        assert!(stored.url.starts_with("memory://generations/"));

        store.delete(&stored.key).await.unwrap();
        assert!(!store.contains(&stored.key));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let stored = store
            .upload(vec![0u8; 4], "2-0.png", "image/png")
            .await
            .unwrap();
        store.delete(&stored.key).await.unwrap();
        // Second delete of the same key must not error.
        store.delete(&stored.key).await.unwrap();
        store.delete("generations/never-existed.png").await.unwrap();
    }
}
