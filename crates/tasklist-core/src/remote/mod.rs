//! Remote task source
//!
//! Thin clients over the remote todos collection. The task store only sees
//! the [`TaskSource`] trait, so the HTTP client and the in-process mock are
//! interchangeable.
//!
//! No retries happen here. A failed call surfaces once as a [`RemoteError`].

mod http;
mod mock;

pub use http::HttpTaskSource;
pub use mock::{MockTaskSource, RemoteCall, DEMO_CREATED_ID};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTodo, TaskId, Todo, TodoListResponse, TodoPatch};

/// Failure talking to the remote source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced an HTTP response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The remote answered with a non-success status
    #[error("Remote returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl RemoteError {
    /// HTTP status, when the remote produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body, when the remote produced one
    pub fn body(&self) -> Option<&str> {
        match self {
            RemoteError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// CRUD operations on the remote todos collection
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch one page of todos
    async fn list(
        &self,
        limit: Option<u32>,
        skip: Option<u32>,
    ) -> Result<TodoListResponse, RemoteError>;

    /// Create a todo; the demo backend answers with a fixed id
    async fn create(&self, todo: &NewTodo) -> Result<Todo, RemoteError>;

    /// Apply a partial update to an existing todo
    async fn update(&self, id: TaskId, patch: &TodoPatch) -> Result<Todo, RemoteError>;

    /// Delete a todo, returning it as it was
    async fn delete(&self, id: TaskId) -> Result<Todo, RemoteError>;
}
