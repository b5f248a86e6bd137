//! Typed facade over the raw [`Database`].
//!
//! Callers upstream (query engine, mutation service, seeders) work with
//! domain types; this facade owns the serde boundary and keeps raw JSON
//! handling out of their code.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::collection::Collection;
use crate::database::{Database, StoreError, StoreResult};
use crate::memory::MemoryDatabase;

/// Cheaply cloneable handle to the persistent store.
#[derive(Clone)]
pub struct Store {
    db: Arc<dyn Database>,
}

impl Store {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Store backed by a fresh [`MemoryDatabase`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryDatabase::new()))
    }

    /// The untyped database handle, for callers that work in raw JSON
    /// (the query engine does).
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.db
    }

    pub async fn get_as<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: u64,
    ) -> StoreResult<Option<T>> {
        let record = self.db.get(collection, id).await?;
        record
            .map(|r| serde_json::from_value(r).map_err(StoreError::from))
            .transpose()
    }

    /// Like [`Store::get_as`] but absent records are an error.
    pub async fn require_as<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: u64,
    ) -> StoreResult<T> {
        self.get_as(collection, id)
            .await?
            .ok_or(StoreError::NotFound { collection, id })
    }

    pub async fn add_value<T: Serialize>(
        &self,
        collection: Collection,
        record: &T,
    ) -> StoreResult<u64> {
        self.db
            .add(collection, serde_json::to_value(record)?)
            .await
    }

    pub async fn bulk_add_values<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> StoreResult<Vec<u64>> {
        let mut raw = Vec::with_capacity(records.len());
        for record in records {
            raw.push(serde_json::to_value(record)?);
        }
        self.db.bulk_add(collection, raw).await
    }

    pub async fn put_value<T: Serialize>(
        &self,
        collection: Collection,
        id: u64,
        record: &T,
    ) -> StoreResult<()> {
        self.db
            .put(collection, id, serde_json::to_value(record)?)
            .await
    }

    pub async fn update(
        &self,
        collection: Collection,
        id: u64,
        patch: JsonValue,
    ) -> StoreResult<JsonValue> {
        self.db.update(collection, id, patch).await
    }

    pub async fn scan_as<T: DeserializeOwned>(&self, collection: Collection) -> StoreResult<Vec<T>> {
        self.db
            .scan(collection)
            .await?
            .into_iter()
            .map(|r| serde_json::from_value(r).map_err(StoreError::from))
            .collect()
    }

    pub async fn find_by_as<T: DeserializeOwned>(
        &self,
        collection: Collection,
        field: &str,
        value: impl Serialize,
    ) -> StoreResult<Vec<T>> {
        let value = serde_json::to_value(value)?;
        self.db
            .find_by(collection, field, &value)
            .await?
            .into_iter()
            .map(|r| serde_json::from_value(r).map_err(StoreError::from))
            .collect()
    }

    pub async fn count(&self, collection: Collection) -> StoreResult<u64> {
        self.db.count(collection).await
    }

    pub async fn delete_by(
        &self,
        collection: Collection,
        field: &str,
        value: impl Serialize,
    ) -> StoreResult<u64> {
        let value = serde_json::to_value(value)?;
        self.db.delete_by(collection, field, &value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        #[serde(default)]
        id: u64,
        job_id: u64,
        label: String,
    }

    #[tokio::test]
    async fn typed_round_trip_through_the_facade() {
        let store = Store::in_memory();
        let row = Row {
            id: 0,
            job_id: 4,
            label: "hello".into(),
        };

        let id = store
            .add_value(Collection::Questions, &row)
            .await
            .unwrap();
        let back: Row = store
            .require_as(Collection::Questions, id)
            .await
            .unwrap();
        assert_eq!(back.id, id);
        assert_eq!(back.label, "hello");

        let found: Vec<Row> = store
            .find_by_as(Collection::Questions, "jobId", 4u64)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn require_as_surfaces_not_found() {
        let store = Store::in_memory();
        let missing = store.require_as::<Row>(Collection::Questions, 9).await;
        assert!(matches!(missing, Err(StoreError::NotFound { id: 9, .. })));
    }
}
