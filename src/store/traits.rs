//! `KeyValueStore` trait: the one persistence seam of the flow.
//!
//! Values are opaque strings, the same contract as browser local storage.
//! Every key lives under a scope (one logical tab/session).

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Backend-agnostic string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, or `None` if the key is absent.
    async fn get(&self, scope: &str, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, scope: &str, key: &str, value: &str) -> Result<(), DatabaseError>;

    /// Remove a key. Returns whether it existed.
    async fn remove(&self, scope: &str, key: &str) -> Result<bool, DatabaseError>;
}
