//! Storage abstraction over keyed JSON collections.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use talentflow_core::ApiError;

use crate::collection::Collection;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: Collection, id: u64 },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound,
            other => ApiError::Storage(other.to_string()),
        }
    }
}

/// Durable keyed collections with auto-incrementing identifiers and
/// secondary-field lookups.
///
/// Contract notes:
/// - `add`/`bulk_add` assign the next positive id for the collection and
///   inject it into the record's `id` field before persisting;
/// - `update` merges the patch's top-level fields into the stored record
///   and rewrites the **whole** record (no partial-field writes); it fails
///   with `NotFound` for an absent id and never creates;
/// - `put` is replace-or-create at a caller-chosen id;
/// - `scan` returns records in stable insertion (id) order;
/// - all operations are durable immediately upon return.
#[async_trait]
pub trait Database: Send + Sync {
    async fn get(&self, collection: Collection, id: u64) -> StoreResult<Option<JsonValue>>;

    async fn add(&self, collection: Collection, record: JsonValue) -> StoreResult<u64>;

    async fn bulk_add(
        &self,
        collection: Collection,
        records: Vec<JsonValue>,
    ) -> StoreResult<Vec<u64>>;

    async fn put(&self, collection: Collection, id: u64, record: JsonValue) -> StoreResult<()>;

    async fn update(
        &self,
        collection: Collection,
        id: u64,
        patch: JsonValue,
    ) -> StoreResult<JsonValue>;

    async fn scan(&self, collection: Collection) -> StoreResult<Vec<JsonValue>>;

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<Vec<JsonValue>>;

    async fn count(&self, collection: Collection) -> StoreResult<u64>;

    /// Delete every record whose `field` equals `value`, returning the
    /// number removed. Only used for re-indexable collections (questions);
    /// jobs, candidates and timelines are never deleted.
    async fn delete_by(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<u64>;
}

/// Set the record's `id` field, making the assigned key visible in the
/// stored JSON the way the wire shape expects.
pub(crate) fn inject_id(record: &mut JsonValue, id: u64) {
    if let Some(obj) = record.as_object_mut() {
        obj.insert("id".to_string(), JsonValue::from(id));
    }
}

/// Merge a patch's top-level fields into an existing record. The stored
/// `id` always wins over anything the patch carries.
pub(crate) fn merge_patch(existing: &mut JsonValue, patch: JsonValue) {
    let (Some(target), Some(fields)) = (existing.as_object_mut(), patch.as_object()) else {
        return;
    };
    for (key, value) in fields {
        if key == "id" {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Field equality used by `find_by`/`delete_by`.
pub(crate) fn field_matches(record: &JsonValue, field: &str, value: &JsonValue) -> bool {
    record.get(field) == Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_patch_keeps_the_stored_id() {
        let mut record = json!({"id": 4, "title": "QA Lead", "order": 2});
        merge_patch(&mut record, json!({"id": 99, "title": "QA Manager"}));
        assert_eq!(record["id"], 4);
        assert_eq!(record["title"], "QA Manager");
        assert_eq!(record["order"], 2);
    }

    #[test]
    fn store_not_found_maps_to_api_not_found() {
        let err = StoreError::NotFound {
            collection: Collection::Jobs,
            id: 12,
        };
        assert_eq!(ApiError::from(err), ApiError::NotFound);
    }
}
