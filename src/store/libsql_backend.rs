//! libSQL backend: `KeyValueStore` over the `settings` table.
//!
//! Supports local file and in-memory databases. The scope maps onto the
//! table's `user_id` column.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::KeyValueStore;

/// libSQL-backed store.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlStore {
    /// Owns the database the connection was opened from. Never read, but
    /// dropping it while `conn` is live closes the underlying handle.
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Pool(format!("Failed to create database directory: {e}"))
                })?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db).await?;
        info!(path = %path.display(), "Session store opened");
        Ok(store)
    }

    /// Create an in-memory database.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait]
impl KeyValueStore for LibSqlStore {
    async fn get(&self, scope: &str, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT value FROM settings WHERE user_id = ?1 AND key = ?2",
                params![scope, key],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("get: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get: {e}"))),
        }
    }

    async fn set(&self, scope: &str, key: &str, value: &str) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO settings (user_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id, key) DO UPDATE SET value = ?3, updated_at = ?4",
                params![scope, key, value, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set: {e}")))?;
        debug!(scope, key, "Stored value");
        Ok(())
    }

    async fn remove(&self, scope: &str, key: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM settings WHERE user_id = ?1 AND key = ?2",
                params![scope, key],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("remove: {e}")))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn settings_crud() {
        let store = LibSqlStore::new_memory().await.unwrap();

        store.set("tab", "userFormData", r#"{"fullName":"Alice"}"#).await.unwrap();
        let fetched = store.get("tab", "userFormData").await.unwrap().unwrap();
        assert_eq!(fetched, r#"{"fullName":"Alice"}"#);

        // Upsert
        store.set("tab", "userFormData", "{}").await.unwrap();
        assert_eq!(store.get("tab", "userFormData").await.unwrap().unwrap(), "{}");

        assert!(store.remove("tab", "userFormData").await.unwrap());
        assert!(store.get("tab", "userFormData").await.unwrap().is_none());
        assert!(!store.remove("tab", "userFormData").await.unwrap());
    }

    #[tokio::test]
    async fn scope_isolation() {
        let store = LibSqlStore::new_memory().await.unwrap();
        store.set("tab1", "interviewCompleted", "true").await.unwrap();

        assert!(store.get("tab2", "interviewCompleted").await.unwrap().is_none());
        assert_eq!(
            store.get("tab1", "interviewCompleted").await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("flow.db");

        {
            let store = LibSqlStore::new_local(&path).await.unwrap();
            store.set("default", "interviewCompleted", "true").await.unwrap();
        }

        let reopened = LibSqlStore::new_local(&path).await.unwrap();
        assert_eq!(
            reopened.get("default", "interviewCompleted").await.unwrap().as_deref(),
            Some("true")
        );
    }
}
