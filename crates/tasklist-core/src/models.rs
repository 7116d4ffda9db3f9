//! Data models for tasklist
//!
//! Two task representations live side by side:
//!
//! - [`Todo`]: the remote API shape (`id`, `todo`, `completed`, `userId`)
//! - [`Task`]: the local shape kept in [`AppState`] and persisted to disk
//!
//! [`AppState`] is the single canonical state published by the task store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier shared by remote todos and local tasks
pub type TaskId = i64;

/// Owner id sent with every created todo (the demo backend has no real users)
pub const DEFAULT_OWNER_ID: i64 = 1;

// ==================== Remote representation ====================

/// A todo as returned by the remote API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TaskId,
    pub todo: String,
    pub completed: bool,
    #[serde(default)]
    pub user_id: i64,
}

/// One page of todos
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

/// Body for creating a todo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub todo: String,
    pub completed: bool,
    pub user_id: i64,
}

impl NewTodo {
    /// An incomplete todo with the given text
    pub fn new(text: impl Into<String>, owner_id: i64) -> Self {
        Self {
            todo: text.into(),
            completed: false,
            user_id: owner_id,
        }
    }
}

/// Partial update body; absent fields are left untouched by the remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that only sets the completed flag
    pub fn completed(completed: bool) -> Self {
        Self {
            todo: None,
            completed: Some(completed),
        }
    }
}

// ==================== Local representation ====================

/// A task as held in local state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    /// Never persisted server-side; must not be sent to update/delete
    #[serde(default, alias = "isCreatedByUserLocally")]
    pub is_created_locally: bool,
}

impl Task {
    /// Create a remote-sourced task
    pub fn new(id: TaskId, title: impl Into<String>, completed: bool) -> Self {
        Self {
            id,
            title: title.into(),
            completed,
            is_created_locally: false,
        }
    }
}

/// Trim a user-entered title, rejecting empty and whitespace-only input
///
/// Callers validate titles with this before invoking `add_task`; the store
/// itself accepts whatever it is given.
pub fn normalize_title(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ==================== Application state ====================

/// Operations that own a loading flag and an error slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    FetchTasks,
    AddTask,
    ToggleTask,
    DeleteTask,
    #[serde(alias = "setTasksFromStorage")]
    LoadFromStorage,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::FetchTasks,
        Operation::AddTask,
        Operation::ToggleTask,
        Operation::DeleteTask,
        Operation::LoadFromStorage,
    ];

    /// Wire name used in persisted state and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FetchTasks => "fetchTasks",
            Operation::AddTask => "addTask",
            Operation::ToggleTask => "toggleTask",
            Operation::DeleteTask => "deleteTask",
            Operation::LoadFromStorage => "loadFromStorage",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical application state
///
/// `tasks` is in display order. `loading` and `errors` always carry an
/// entry for every [`Operation`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppState {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub loading: BTreeMap<Operation, bool>,
    #[serde(default)]
    pub errors: BTreeMap<Operation, Option<String>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_tasks(Vec::new())
    }
}

impl AppState {
    /// State holding the given tasks with all flags cleared
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            loading: Operation::ALL.iter().map(|op| (*op, false)).collect(),
            errors: Operation::ALL.iter().map(|op| (*op, None)).collect(),
        }
    }

    /// Fill in any operation keys missing from `loading` / `errors`
    ///
    /// Persisted blobs written by older versions may lack some keys.
    pub fn normalized(mut self) -> Self {
        for op in Operation::ALL {
            self.loading.entry(op).or_insert(false);
            self.errors.entry(op).or_insert(None);
        }
        self
    }

    pub fn is_loading(&self, op: Operation) -> bool {
        self.loading.get(&op).copied().unwrap_or(false)
    }

    pub fn error(&self, op: Operation) -> Option<&str> {
        self.errors.get(&op).and_then(|e| e.as_deref())
    }

    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of tasks that exist only locally
    pub fn local_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_created_locally).count()
    }
}
