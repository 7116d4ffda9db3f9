//! In-process task source
//!
//! Behaves like the demo backend: creations always answer with the same id,
//! nothing is actually persisted, and update/delete of an id it never issued
//! fails with 404. Calls are recorded and failures can be queued so tests can
//! verify exactly what the task store sent.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{RemoteError, TaskSource};
use crate::models::{NewTodo, TaskId, Todo, TodoListResponse, TodoPatch};

/// Id the demo backend assigns to every created todo
pub const DEMO_CREATED_ID: TaskId = 255;

/// A call received by [`MockTaskSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    List {
        limit: Option<u32>,
        skip: Option<u32>,
    },
    Create(NewTodo),
    Update(TaskId, TodoPatch),
    Delete(TaskId),
}

/// Mock remote source for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct MockTaskSource {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    todos: Vec<Todo>,
    calls: Vec<RemoteCall>,
    latency: Option<Duration>,
    fail_next_list: Option<RemoteError>,
    fail_next_create: Option<RemoteError>,
    fail_next_update: Option<RemoteError>,
    fail_next_delete: Option<RemoteError>,
}

impl MockTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock serving the given todos
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let source = Self::new();
        source.lock().todos = todos;
        source
    }

    /// Delay every call by `latency` before answering
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// All calls received so far
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn fail_next_list(&self, error: RemoteError) {
        self.lock().fail_next_list = Some(error);
    }

    pub fn fail_next_create(&self, error: RemoteError) {
        self.lock().fail_next_create = Some(error);
    }

    pub fn fail_next_update(&self, error: RemoteError) {
        self.lock().fail_next_update = Some(error);
    }

    pub fn fail_next_delete(&self, error: RemoteError) {
        self.lock().fail_next_delete = Some(error);
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        // A panicking test thread must not wedge the others
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn wait(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn not_found(id: TaskId) -> RemoteError {
    RemoteError::Status {
        status: 404,
        body: format!(r#"{{"message":"Todo with id '{}' not found"}}"#, id),
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn list(
        &self,
        limit: Option<u32>,
        skip: Option<u32>,
    ) -> Result<TodoListResponse, RemoteError> {
        self.wait().await;
        let mut inner = self.lock();
        inner.calls.push(RemoteCall::List { limit, skip });
        if let Some(error) = inner.fail_next_list.take() {
            return Err(error);
        }

        let total = inner.todos.len();
        let skip = skip.unwrap_or(0) as usize;
        let limit = limit.map_or(total, |l| l as usize);
        let todos: Vec<Todo> = inner.todos.iter().skip(skip).take(limit).cloned().collect();

        Ok(TodoListResponse {
            limit: todos.len() as u64,
            todos,
            total: total as u64,
            skip: skip as u64,
        })
    }

    async fn create(&self, todo: &NewTodo) -> Result<Todo, RemoteError> {
        self.wait().await;
        let mut inner = self.lock();
        inner.calls.push(RemoteCall::Create(todo.clone()));
        if let Some(error) = inner.fail_next_create.take() {
            return Err(error);
        }

        Ok(Todo {
            id: DEMO_CREATED_ID,
            todo: todo.todo.clone(),
            completed: todo.completed,
            user_id: todo.user_id,
        })
    }

    async fn update(&self, id: TaskId, patch: &TodoPatch) -> Result<Todo, RemoteError> {
        self.wait().await;
        let mut inner = self.lock();
        inner.calls.push(RemoteCall::Update(id, patch.clone()));
        if let Some(error) = inner.fail_next_update.take() {
            return Err(error);
        }

        let mut todo = inner
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))?;
        if let Some(ref text) = patch.todo {
            todo.todo = text.clone();
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(todo)
    }

    async fn delete(&self, id: TaskId) -> Result<Todo, RemoteError> {
        self.wait().await;
        let mut inner = self.lock();
        inner.calls.push(RemoteCall::Delete(id));
        if let Some(error) = inner.fail_next_delete.take() {
            return Err(error);
        }

        inner
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }
}
