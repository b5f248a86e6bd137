//! SQLite-backed database.
//!
//! Persists every collection into a single `records` table of serde_json
//! payloads, keyed by `(collection, id)`. This is the backend to use when
//! the dataset should survive process restarts; the wire shape stored in
//! `data` is identical to what [`crate::MemoryDatabase`] holds.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::collection::Collection;
use crate::database::{field_matches, inject_id, merge_patch, Database, StoreError, StoreResult};

/// SQLite-backed keyed collections.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (or create) a database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        tracing::debug!(path = %path.display(), "opened sqlite database");
        Self::init(pool).await
    }

    /// Open a private in-memory database (single connection, so every
    /// operation sees the same data).
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT    NOT NULL,
                id         INTEGER NOT NULL,
                data       TEXT    NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    fn decode(data: String) -> StoreResult<JsonValue> {
        Ok(serde_json::from_str(&data)?)
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn get(&self, collection: Collection, id: u64) -> StoreResult<Option<JsonValue>> {
        let row = sqlx::query("SELECT data FROM records WHERE collection = ?1 AND id = ?2")
            .bind(collection.name())
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::decode(r.try_get("data")?)).transpose()
    }

    async fn add(&self, collection: Collection, mut record: JsonValue) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT COALESCE(MAX(id), 0) AS max_id FROM records WHERE collection = ?1")
            .bind(collection.name())
            .fetch_one(&mut *tx)
            .await?;
        let id = (row.try_get::<i64, _>("max_id")? as u64) + 1;

        inject_id(&mut record, id);
        sqlx::query("INSERT INTO records (collection, id, data) VALUES (?1, ?2, ?3)")
            .bind(collection.name())
            .bind(id as i64)
            .bind(record.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn bulk_add(
        &self,
        collection: Collection,
        records: Vec<JsonValue>,
    ) -> StoreResult<Vec<u64>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT COALESCE(MAX(id), 0) AS max_id FROM records WHERE collection = ?1")
            .bind(collection.name())
            .fetch_one(&mut *tx)
            .await?;
        let mut next = (row.try_get::<i64, _>("max_id")? as u64) + 1;

        let mut ids = Vec::with_capacity(records.len());
        for mut record in records {
            inject_id(&mut record, next);
            sqlx::query("INSERT INTO records (collection, id, data) VALUES (?1, ?2, ?3)")
                .bind(collection.name())
                .bind(next as i64)
                .bind(record.to_string())
                .execute(&mut *tx)
                .await?;
            ids.push(next);
            next += 1;
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn put(&self, collection: Collection, id: u64, mut record: JsonValue) -> StoreResult<()> {
        inject_id(&mut record, id);
        sqlx::query("INSERT OR REPLACE INTO records (collection, id, data) VALUES (?1, ?2, ?3)")
            .bind(collection.name())
            .bind(id as i64)
            .bind(record.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: u64,
        patch: JsonValue,
    ) -> StoreResult<JsonValue> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT data FROM records WHERE collection = ?1 AND id = ?2")
            .bind(collection.name())
            .bind(id as i64)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound { collection, id })?;

        let mut record = Self::decode(row.try_get("data")?)?;
        merge_patch(&mut record, patch);

        sqlx::query("UPDATE records SET data = ?3 WHERE collection = ?1 AND id = ?2")
            .bind(collection.name())
            .bind(id as i64)
            .bind(record.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn scan(&self, collection: Collection) -> StoreResult<Vec<JsonValue>> {
        let rows = sqlx::query("SELECT data FROM records WHERE collection = ?1 ORDER BY id ASC")
            .bind(collection.name())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| Self::decode(r.try_get("data")?))
            .collect()
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<Vec<JsonValue>> {
        // Field matching happens in Rust so the JSON semantics are exactly
        // the same as the in-memory backend's.
        let all = self.scan(collection).await?;
        Ok(all
            .into_iter()
            .filter(|r| field_matches(r, field, value))
            .collect())
    }

    async fn count(&self, collection: Collection) -> StoreResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM records WHERE collection = ?1")
            .bind(collection.name())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("n")? as u64)
    }

    async fn delete_by(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<u64> {
        let matches = self.find_by(collection, field, value).await?;

        let mut tx = self.pool.begin().await?;
        let mut removed = 0u64;
        for record in &matches {
            let Some(id) = record.get("id").and_then(JsonValue::as_u64) else {
                continue;
            };
            let result = sqlx::query("DELETE FROM records WHERE collection = ?1 AND id = ?2")
                .bind(collection.name())
                .bind(id as i64)
                .execute(&mut *tx)
                .await?;
            removed += result.rows_affected();
        }
        tx.commit().await?;

        Ok(removed)
    }
}
