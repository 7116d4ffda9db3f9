//! HTTP client for the remote todos API
//!
//! Endpoints, relative to the configured collection URL:
//!
//! - `GET    {base}?limit&skip`  list
//! - `POST   {base}/add`         create
//! - `PUT    {base}/{id}`        update (partial body)
//! - `DELETE {base}/{id}`        delete

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{RemoteError, TaskSource};
use crate::config::Config;
use crate::models::{NewTodo, TaskId, Todo, TodoListResponse, TodoPatch};

/// [`TaskSource`] backed by the remote HTTP API
#[derive(Debug, Clone)]
pub struct HttpTaskSource {
    client: Client,
    base_url: String,
}

impl HttpTaskSource {
    /// Create a client for the collection at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tasklist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: TaskId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// Send a request and decode a JSON body, mapping every failure
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "API request failed");
            RemoteError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "API error");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn list(
        &self,
        limit: Option<u32>,
        skip: Option<u32>,
    ) -> Result<TodoListResponse, RemoteError> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        if let Some(skip) = skip {
            query.push(("skip", skip));
        }

        debug!(?limit, ?skip, "GET {}", self.base_url);
        self.send(self.client.get(&self.base_url).query(&query))
            .await
    }

    async fn create(&self, todo: &NewTodo) -> Result<Todo, RemoteError> {
        let url = format!("{}/add", self.base_url);
        debug!("POST {}", url);
        self.send(self.client.post(&url).json(todo)).await
    }

    async fn update(&self, id: TaskId, patch: &TodoPatch) -> Result<Todo, RemoteError> {
        let url = self.item_url(id);
        debug!("PUT {}", url);
        self.send(self.client.put(&url).json(patch)).await
    }

    async fn delete(&self, id: TaskId) -> Result<Todo, RemoteError> {
        let url = self.item_url(id);
        debug!("DELETE {}", url);
        self.send(self.client.delete(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    const UNKNOWN_ID: i64 = 999;

    async fn list_todos(Query(params): Query<HashMap<String, u64>>) -> Json<Value> {
        let limit = params.get("limit").copied().unwrap_or(30);
        let skip = params.get("skip").copied().unwrap_or(0);
        Json(json!({
            "todos": [
                {"id": 1, "todo": "A", "completed": false, "userId": 1},
                {"id": 2, "todo": "B", "completed": true, "userId": 1}
            ],
            "total": 2,
            "skip": skip,
            "limit": limit
        }))
    }

    async fn add_todo(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({
            "id": 255,
            "todo": body["todo"],
            "completed": body["completed"],
            "userId": body["userId"]
        }))
    }

    async fn update_todo(
        Path(id): Path<i64>,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, (StatusCode, String)> {
        if id == UNKNOWN_ID {
            return Err((
                StatusCode::NOT_FOUND,
                format!(r#"{{"message":"Todo with id '{}' not found"}}"#, id),
            ));
        }
        Ok(Json(json!({
            "id": id,
            "todo": "A",
            "completed": body["completed"],
            "userId": 1
        })))
    }

    async fn delete_todo(Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
        if id == UNKNOWN_ID {
            return Err(StatusCode::NOT_FOUND);
        }
        Ok(Json(json!({
            "id": id,
            "todo": "A",
            "completed": false,
            "userId": 1,
            "isDeleted": true,
            "deletedOn": "2024-01-01T00:00:00.000Z"
        })))
    }

    async fn not_json() -> &'static str {
        "<html>oops</html>"
    }

    /// Serve a fake todos API on an ephemeral port, returning its base URL
    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/todos", get(list_todos))
            .route("/todos/add", post(add_todo))
            .route("/todos/:id", put(update_todo).delete(delete_todo))
            .route("/broken", get(not_json));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    async fn client(path: &str) -> HttpTaskSource {
        let base = spawn_server().await;
        HttpTaskSource::new(&format!("{}{}", base, path), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_passes_pagination() {
        let source = client("/todos").await;

        let page = source.list(Some(10), Some(20)).await.unwrap();
        assert_eq!(page.todos.len(), 2);
        assert_eq!(page.limit, 10);
        assert_eq!(page.skip, 20);
        assert_eq!(page.todos[1].todo, "B");
        assert!(page.todos[1].completed);

        let page = source.list(None, None).await.unwrap();
        assert_eq!(page.limit, 30);
        assert_eq!(page.skip, 0);
    }

    #[tokio::test]
    async fn test_create_sends_json_body() {
        let source = client("/todos/").await;

        let todo = source.create(&NewTodo::new("Buy milk", 1)).await.unwrap();
        assert_eq!(todo.id, 255);
        assert_eq!(todo.todo, "Buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.user_id, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let source = client("/todos").await;

        let updated = source.update(1, &TodoPatch::completed(true)).await.unwrap();
        assert_eq!(updated.id, 1);
        assert!(updated.completed);

        let deleted = source.delete(2).await.unwrap();
        assert_eq!(deleted.id, 2);
    }

    #[tokio::test]
    async fn test_unknown_id_is_status_error() {
        let source = client("/todos").await;

        let err = source
            .update(UNKNOWN_ID, &TodoPatch::completed(true))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.body().unwrap().contains("not found"));

        let err = source.delete(UNKNOWN_ID).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_non_json_response_is_decode_error() {
        let source = client("/broken").await;
        let err = source.list(None, None).await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source =
            HttpTaskSource::new(&format!("http://{}/todos", addr), Duration::from_secs(2)).unwrap();
        let err = source.list(None, None).await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let source = HttpTaskSource::new("http://example.com/todos/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.base_url(), "http://example.com/todos");
        assert_eq!(source.item_url(4), "http://example.com/todos/4");
    }
}
