//! tasklist core library
//!
//! Task-list state synchronization: a remote demo todos API, a local durable
//! copy of the application state, and a reducer-driven store that keeps the
//! two reconciled.
//!
//! # Architecture
//!
//! - **Remote**: source of todos; never retried, failures surface per operation
//! - **Local storage**: the whole state as one JSON blob, survives restarts
//! - **Store**: canonical in-memory state, persisted after every change
//!
//! # Quick Start
//!
//! ```text
//! let store = TaskStore::open(&Config::load()?)?;
//! store.load_from_storage().await?;
//!
//! let id = store.add_task("Buy milk").await?;
//! store.toggle_task_completion(id).await?;
//!
//! for task in store.tasks() { ... }
//! store.flush().await;
//! ```
//!
//! # Modules
//!
//! - `state`: reducer and the `TaskStore` (main entry point)
//! - `models`: remote todos, local tasks and `AppState`
//! - `mapper`: todo <-> task translation
//! - `remote`: HTTP and mock task sources
//! - `storage`: key-value backends and state persistence
//! - `config`: application configuration

pub mod config;
pub mod mapper;
pub mod models;
pub mod remote;
pub mod state;
pub mod storage;

pub use config::{Config, StorageBackend};
pub use models::{normalize_title, AppState, Operation, Task, TaskId, Todo};
pub use remote::{HttpTaskSource, MockTaskSource, RemoteError, TaskSource};
pub use state::{TaskError, TaskStore, TaskStoreOptions};
pub use storage::{StatePersistence, StorageError};
