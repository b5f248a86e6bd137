//! `talentflow-store`: the persistent store behind the emulated backend.
//!
//! Six named collections of JSON records, each independently keyed by an
//! auto-incrementing positive integer. The [`Database`] trait abstracts the
//! backing storage; [`MemoryDatabase`] serves tests/dev and
//! [`SqliteDatabase`] persists across sessions. The typed [`Store`] facade
//! layers serde on top so callers work with domain types, not raw JSON.
//!
//! All operations are durable immediately upon return (no write buffering)
//! and every mutation is applied as a whole-record replace-or-create.

pub mod collection;
pub mod database;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use collection::Collection;
pub use database::{Database, StoreError, StoreResult};
pub use memory::MemoryDatabase;
pub use sqlite::SqliteDatabase;
pub use store::Store;
