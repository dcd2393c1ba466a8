//! `SQLite` implementation of the `KeyValueStore` port.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::ports::KeyValueStore;

#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM local_storage WHERE storage_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO local_storage (storage_key, value, updated_at)
               VALUES (?, ?, datetime('now'))
               ON CONFLICT(storage_key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at"#
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM local_storage WHERE storage_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_store() -> SqliteKeyValueStore {
        SqliteKeyValueStore::new(create_migrated_test_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = setup_test_store().await;
        store.set("fullProfile_alice", "{\"a\":1}").await.unwrap();
        store.set("fullProfile_alice", "{\"a\":2}").await.unwrap();

        let value = store.get("fullProfile_alice").await.unwrap();
        assert_eq!(value.as_deref(), Some("{\"a\":2}"));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let store = setup_test_store().await;
        store.remove("onboardingDismissalStatus_nobody").await.unwrap();
        assert!(store.get("onboardingDismissalStatus_nobody").await.unwrap().is_none());
    }
}
