//! Storage layer
//!
//! Local durable store for the application state.
//!
//! ## Architecture
//!
//! - **Backends**: string key-value stores (SQLite table or plain files)
//! - **StatePersistence**: JSON-encodes the whole `AppState` under one key
//!
//! Storage failures are logged at the persistence boundary and never
//! surface to the task store.

pub mod error;
pub mod kv;
pub mod persistence;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use persistence::{StatePersistence, STORAGE_KEY};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
