//! In-memory key-value store for ephemeral tabs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DatabaseError;
use crate::store::traits::KeyValueStore;

/// `HashMap`-backed store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(String, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no scope holds any key.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, scope: &str, key: &str) -> Result<Option<String>, DatabaseError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(scope.to_string(), key.to_string())).cloned())
    }

    async fn set(&self, scope: &str, key: &str, value: &str) -> Result<(), DatabaseError> {
        let mut entries = self.entries.write().await;
        entries.insert((scope.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    async fn remove(&self, scope: &str, key: &str) -> Result<bool, DatabaseError> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(&(scope.to_string(), key.to_string())).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);

        store.set("tab", "k", "v1").await.unwrap();
        store.set("tab", "k", "v2").await.unwrap();
        assert_eq!(store.get("tab", "k").await.unwrap().as_deref(), Some("v2"));
        assert!(!store.is_empty().await);

        assert!(store.remove("tab", "k").await.unwrap());
        assert!(!store.remove("tab", "k").await.unwrap());
        assert!(store.get("tab", "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let store = MemoryStore::new();
        store.set("a", "k", "1").await.unwrap();
        store.set("b", "k", "2").await.unwrap();
        assert_eq!(store.get("a", "k").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b", "k").await.unwrap().as_deref(), Some("2"));
    }
}
