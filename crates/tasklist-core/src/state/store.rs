//! Task store
//!
//! The `TaskStore` owns the canonical [`AppState`] and runs the five
//! operations against the remote source and the durable store.
//!
//! ## Publishing
//!
//! State lives in a `tokio::sync::watch` channel. Readers take snapshots or
//! subscribe; only [`TaskAction`]s passed through [`reduce`] change it.
//!
//! ## Persistence
//!
//! Every committed transition queues the resulting state to a background
//! writer. Operations never wait for the write and write failures are only
//! logged. [`TaskStore::flush`] waits until everything queued so far is on
//! disk.
//!
//! ## Concurrency
//!
//! Operations may overlap. Remote calls run outside the state lock, and each
//! transition applies to whatever state exists when it resolves, so the last
//! one to resolve wins. Each operation only touches its own loading and
//! error slot.
//!
//! ```ignore
//! let store = TaskStore::open(&Config::load()?)?;
//! store.load_from_storage().await?;
//! store.add_task("Buy milk").await?;
//! store.flush().await;
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::action::{next_local_id, reduce, TaskAction};
use super::error::TaskError;
use crate::config::Config;
use crate::mapper::{mark_created_locally, todo_to_task, todos_to_tasks};
use crate::models::{AppState, NewTodo, Operation, Task, TaskId, Todo, TodoPatch, DEFAULT_OWNER_ID};
use crate::remote::{HttpTaskSource, TaskSource};
use crate::storage::StatePersistence;

/// Tunables for a [`TaskStore`]
#[derive(Debug, Clone)]
pub struct TaskStoreOptions {
    /// Owner id sent with created todos
    pub owner_id: i64,
    /// Page size for full fetches
    pub fetch_limit: Option<u32>,
}

impl Default for TaskStoreOptions {
    fn default() -> Self {
        Self {
            owner_id: DEFAULT_OWNER_ID,
            fetch_limit: None,
        }
    }
}

impl From<&Config> for TaskStoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            owner_id: config.owner_id,
            fetch_limit: config.fetch_limit,
        }
    }
}

enum WriterCommand {
    Save(AppState),
    Flush(oneshot::Sender<()>),
}

/// Handle to the application's task state
///
/// Cheap to clone; all clones share one state. Must be created inside a
/// Tokio runtime because it spawns the persistence writer.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn TaskSource>,
    persistence: Arc<StatePersistence>,
    state: watch::Sender<AppState>,
    writer: mpsc::UnboundedSender<WriterCommand>,
    options: TaskStoreOptions,
}

impl TaskStore {
    pub fn new(source: Arc<dyn TaskSource>, persistence: StatePersistence) -> Self {
        Self::with_options(source, persistence, TaskStoreOptions::default())
    }

    pub fn with_options(
        source: Arc<dyn TaskSource>,
        persistence: StatePersistence,
        options: TaskStoreOptions,
    ) -> Self {
        let persistence = Arc::new(persistence);
        let (state, _) = watch::channel(AppState::default());
        let (writer, writer_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_writer(Arc::clone(&persistence), writer_rx));

        Self {
            inner: Arc::new(Inner {
                source,
                persistence,
                state,
                writer,
                options,
            }),
        }
    }

    /// Store backed by the HTTP API and the configured storage backend
    pub fn open(config: &Config) -> Result<Self> {
        let source = HttpTaskSource::from_config(config).context("Failed to create API client")?;
        let persistence =
            StatePersistence::from_config(config).context("Failed to open local storage")?;
        Ok(Self::with_options(
            Arc::new(source),
            persistence,
            TaskStoreOptions::from(config),
        ))
    }

    // ==================== Published state ====================

    /// Current state
    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.inner.state.borrow().tasks.clone()
    }

    pub fn find_task(&self, id: TaskId) -> Option<Task> {
        self.inner.state.borrow().find_task(id).cloned()
    }

    pub fn is_fetch_tasks_loading(&self) -> bool {
        self.inner.state.borrow().is_loading(Operation::FetchTasks)
    }

    /// Wait until every state queued for persistence has been written
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.inner.writer.send(WriterCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    // ==================== Operations ====================

    /// Startup: adopt the cached state, or fetch from remote if there is none
    pub async fn load_from_storage(&self) -> Result<(), TaskError> {
        if self.restore_from_storage().await {
            return Ok(());
        }
        info!("No cached tasks, fetching from remote");
        self.fetch_tasks().await
    }

    /// Adopt the cached state if it holds any tasks, without calling the remote
    ///
    /// Returns whether a cached state was adopted.
    pub async fn restore_from_storage(&self) -> bool {
        self.dispatch(TaskAction::SetLoading(Operation::LoadFromStorage));

        let persistence = Arc::clone(&self.inner.persistence);
        let stored = tokio::task::spawn_blocking(move || persistence.load())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Loading persisted state panicked");
                None
            });

        match stored {
            Some(state) if !state.tasks.is_empty() => {
                info!(tasks = state.tasks.len(), "Loaded tasks from local storage");
                self.dispatch(TaskAction::SetStateFromStorage(state));
                true
            }
            _ => {
                self.dispatch(TaskAction::Settle(Operation::LoadFromStorage));
                false
            }
        }
    }

    /// Replace the task list with the remote list
    ///
    /// Locally created tasks are not known to the remote and are dropped.
    pub async fn fetch_tasks(&self) -> Result<(), TaskError> {
        let op = Operation::FetchTasks;
        self.dispatch(TaskAction::SetLoading(op));

        let page = match self.inner.source.list(self.inner.options.fetch_limit, None).await {
            Ok(page) => page,
            Err(e) => return self.fail(op, e.into()),
        };

        let tasks = todos_to_tasks(page.todos);
        info!(count = tasks.len(), total = page.total, "Fetched tasks");
        self.dispatch_with(|state| {
            let discarded = state.local_task_count();
            if discarded > 0 {
                warn!(discarded, "Fetch replaced locally created tasks");
            }
            TaskAction::FetchTasks(tasks)
        });
        Ok(())
    }

    /// Create a task and append it to the list
    ///
    /// `title` must already be validated (see [`crate::models::normalize_title`]).
    /// The remote answers with a shared demo id, so the task gets a fresh
    /// local id and is flagged as created locally. Returns that id.
    pub async fn add_task(&self, title: &str) -> Result<TaskId, TaskError> {
        let op = Operation::AddTask;
        self.dispatch(TaskAction::SetLoading(op));

        let todo = NewTodo::new(title, self.inner.options.owner_id);
        let created = match self.inner.source.create(&todo).await {
            Ok(created) => created,
            Err(e) => return self.fail(op, e.into()).map(|_| 0),
        };

        let remote_id = created.id;
        let mut new_id = 0;
        self.dispatch_with(|state| {
            new_id = next_local_id(&state.tasks, chrono::Utc::now().timestamp_millis());
            TaskAction::AddTask(mark_created_locally(todo_to_task(Todo {
                id: new_id,
                ..created
            })))
        });
        debug!(remote_id, local_id = new_id, "Added task");
        Ok(new_id)
    }

    /// Flip a task's completed flag
    ///
    /// Local tasks flip without a remote call. Remote tasks are updated
    /// remotely first; on success the flag is flipped on the task with the
    /// original id, whatever id the response carries.
    pub async fn toggle_task_completion(&self, id: TaskId) -> Result<(), TaskError> {
        let op = Operation::ToggleTask;
        self.dispatch(TaskAction::SetLoading(op));

        let Some(task) = self.find_task(id) else {
            return self.fail(op, TaskError::NotFound { id });
        };

        if !task.is_created_locally {
            let patch = TodoPatch::completed(!task.completed);
            match self.inner.source.update(id, &patch).await {
                Ok(todo) => debug!(id, remote_completed = todo.completed, "Remote toggle accepted"),
                Err(e) => return self.fail(op, e.into()),
            }
        }

        self.dispatch(TaskAction::ToggleTaskCompletion(id));
        Ok(())
    }

    /// Remove a task
    ///
    /// Local tasks are removed without a remote call. Remote tasks are deleted
    /// remotely first; on success the task with the original id is removed.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), TaskError> {
        let op = Operation::DeleteTask;
        self.dispatch(TaskAction::SetLoading(op));

        let Some(task) = self.find_task(id) else {
            return self.fail(op, TaskError::NotFound { id });
        };

        if !task.is_created_locally {
            match self.inner.source.delete(id).await {
                Ok(todo) => debug!(id, response_id = todo.id, "Remote delete accepted"),
                Err(e) => return self.fail(op, e.into()),
            }
        }

        self.dispatch(TaskAction::DeleteTask(id));
        Ok(())
    }

    // ==================== Dispatch ====================

    fn fail(&self, operation: Operation, error: TaskError) -> Result<(), TaskError> {
        warn!(%operation, error = %error, "Operation failed");
        self.dispatch(TaskAction::SetError {
            operation,
            message: error.to_string(),
        });
        Err(error)
    }

    fn dispatch(&self, action: TaskAction) {
        self.dispatch_with(|_| action);
    }

    /// Build an action from the current state and apply it
    ///
    /// Runs under the watch channel's write lock, so the action sees the
    /// exact state it is applied to and writes are queued in transition order.
    fn dispatch_with(&self, make_action: impl FnOnce(&AppState) -> TaskAction) {
        let writer = &self.inner.writer;
        self.inner.state.send_modify(|state| {
            let action = make_action(state);
            let commit = action.is_commit();
            *state = reduce(std::mem::take(state), action);

            if commit && writer.send(WriterCommand::Save(state.clone())).is_err() {
                warn!("State writer stopped, change not persisted");
            }
        });
    }
}

/// Background task applying queued writes in order
async fn run_writer(
    persistence: Arc<StatePersistence>,
    mut commands: mpsc::UnboundedReceiver<WriterCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            WriterCommand::Save(state) => {
                let persistence = Arc::clone(&persistence);
                if let Err(e) = tokio::task::spawn_blocking(move || persistence.save(&state)).await
                {
                    warn!(error = %e, "State write panicked");
                }
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("State writer stopped");
}
