//! Durable application-state persistence
//!
//! The whole [`AppState`] is serialized as JSON and stored under a single
//! fixed key. `save` and `load` never fail from the caller's point of view:
//! storage errors are logged and the mutation path that triggered them keeps
//! going.

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
use crate::config::{Config, StorageBackend};
use crate::models::{AppState, Task};

/// Key the state blob is stored under
pub const STORAGE_KEY: &str = "localTasksState";

/// Shapes accepted when reading the blob back
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredState {
    /// Older builds stored only the task list
    Tasks(Vec<Task>),
    Full(AppState),
}

/// Persistence layer for the application state
pub struct StatePersistence {
    backend: Box<dyn KeyValueStore>,
}

impl StatePersistence {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Open the backend selected by `config.storage_backend`
    pub fn from_config(config: &Config) -> StorageResult<Self> {
        let persistence = match config.storage_backend {
            StorageBackend::Sqlite => {
                Self::new(SqliteKeyValueStore::open(&config.state_db_path())?)
            }
            StorageBackend::File => Self::new(FileKeyValueStore::new(config.state_file_path())),
        };
        Ok(persistence)
    }

    /// Non-durable persistence, for tests and dry runs
    pub fn in_memory() -> Self {
        Self::new(MemoryKeyValueStore::new())
    }

    /// Write the full state, logging instead of returning any failure
    pub fn save(&self, state: &AppState) {
        match self.try_save(state) {
            Ok(()) => debug!(tasks = state.tasks.len(), "Persisted state"),
            Err(e) => warn!(
                error = %e,
                hint = e.recovery_suggestion().unwrap_or_default(),
                "Failed to persist state"
            ),
        }
    }

    /// Read the stored state, `None` if absent or unreadable
    pub fn load(&self) -> Option<AppState> {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    error = %e,
                    hint = e.recovery_suggestion().unwrap_or_default(),
                    "Failed to load persisted state"
                );
                None
            }
        }
    }

    pub fn try_save(&self, state: &AppState) -> StorageResult<()> {
        let json = serde_json::to_string(state).map_err(StorageError::Serialize)?;
        self.backend.set(STORAGE_KEY, &json)
    }

    pub fn try_load(&self) -> StorageResult<Option<AppState>> {
        let Some(json) = self.backend.get(STORAGE_KEY)? else {
            return Ok(None);
        };

        let stored: StoredState =
            serde_json::from_str(&json).map_err(|e| StorageError::CorruptValue {
                key: STORAGE_KEY.to_string(),
                details: e.to_string(),
            })?;

        let state = match stored {
            StoredState::Tasks(tasks) => AppState::with_tasks(tasks),
            StoredState::Full(state) => state.normalized(),
        };
        Ok(Some(state))
    }
}
