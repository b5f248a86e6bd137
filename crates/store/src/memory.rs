//! In-memory database.
//!
//! The default backend for tests and dev sessions. "Durable" here means
//! durable for the process lifetime, which is exactly what the emulated
//! backend needs; swap in [`crate::SqliteDatabase`] to survive restarts.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::collection::Collection;
use crate::database::{field_matches, inject_id, merge_patch, Database, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, JsonValue>,
}

impl Table {
    fn assign_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory keyed collections behind a single `RwLock`.
///
/// Ids are monotonic per collection, so the `BTreeMap` iteration order is
/// stable insertion order, which is what `scan` promises.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<HashMap<Collection, Table>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_table<T>(
        &self,
        collection: Collection,
        f: impl FnOnce(Option<&Table>) -> T,
    ) -> StoreResult<T> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(f(tables.get(&collection)))
    }

    fn write_table<T>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut Table) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        f(tables.entry(collection).or_default())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn get(&self, collection: Collection, id: u64) -> StoreResult<Option<JsonValue>> {
        self.read_table(collection, |table| {
            table.and_then(|t| t.rows.get(&id).cloned())
        })
    }

    async fn add(&self, collection: Collection, mut record: JsonValue) -> StoreResult<u64> {
        self.write_table(collection, |table| {
            let id = table.assign_id();
            inject_id(&mut record, id);
            table.rows.insert(id, record);
            Ok(id)
        })
    }

    async fn bulk_add(
        &self,
        collection: Collection,
        records: Vec<JsonValue>,
    ) -> StoreResult<Vec<u64>> {
        self.write_table(collection, |table| {
            let mut ids = Vec::with_capacity(records.len());
            for mut record in records {
                let id = table.assign_id();
                inject_id(&mut record, id);
                table.rows.insert(id, record);
                ids.push(id);
            }
            Ok(ids)
        })
    }

    async fn put(&self, collection: Collection, id: u64, mut record: JsonValue) -> StoreResult<()> {
        self.write_table(collection, |table| {
            inject_id(&mut record, id);
            table.rows.insert(id, record);
            // Keep later adds from colliding with caller-chosen ids.
            table.next_id = table.next_id.max(id);
            Ok(())
        })
    }

    async fn update(
        &self,
        collection: Collection,
        id: u64,
        patch: JsonValue,
    ) -> StoreResult<JsonValue> {
        self.write_table(collection, |table| {
            let record = table
                .rows
                .get_mut(&id)
                .ok_or(StoreError::NotFound { collection, id })?;
            merge_patch(record, patch);
            Ok(record.clone())
        })
    }

    async fn scan(&self, collection: Collection) -> StoreResult<Vec<JsonValue>> {
        self.read_table(collection, |table| {
            table.map_or_else(Vec::new, |t| t.rows.values().cloned().collect())
        })
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<Vec<JsonValue>> {
        self.read_table(collection, |table| {
            table.map_or_else(Vec::new, |t| {
                t.rows
                    .values()
                    .filter(|r| field_matches(r, field, value))
                    .cloned()
                    .collect()
            })
        })
    }

    async fn count(&self, collection: Collection) -> StoreResult<u64> {
        self.read_table(collection, |table| {
            table.map_or(0, |t| t.rows.len() as u64)
        })
    }

    async fn delete_by(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<u64> {
        self.write_table(collection, |table| {
            let before = table.rows.len();
            table.rows.retain(|_, r| !field_matches(r, field, value));
            Ok((before - table.rows.len()) as u64)
        })
    }
}
