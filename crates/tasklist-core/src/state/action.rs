//! State transitions
//!
//! Every change to [`AppState`] is a [`TaskAction`] run through [`reduce`].

use crate::models::{AppState, Operation, Task, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Operation started
    SetLoading(Operation),
    /// Operation failed; records the message and clears its loading flag
    SetError { operation: Operation, message: String },
    /// Operation finished without changing tasks
    Settle(Operation),
    /// Replace the whole sequence with freshly fetched tasks
    FetchTasks(Vec<Task>),
    /// Append a new task
    AddTask(Task),
    /// Flip `completed` on the task with this id
    ToggleTaskCompletion(TaskId),
    /// Remove the task with this id
    DeleteTask(TaskId),
    /// Adopt a persisted state wholesale
    SetStateFromStorage(AppState),
}

impl TaskAction {
    /// Whether this transition commits a change that must be persisted
    pub fn is_commit(&self) -> bool {
        matches!(
            self,
            TaskAction::FetchTasks(_)
                | TaskAction::AddTask(_)
                | TaskAction::ToggleTaskCompletion(_)
                | TaskAction::DeleteTask(_)
                | TaskAction::SetStateFromStorage(_)
        )
    }
}

/// Produce the next state
pub fn reduce(mut state: AppState, action: TaskAction) -> AppState {
    match action {
        TaskAction::SetLoading(op) => {
            state.loading.insert(op, true);
        }
        TaskAction::SetError { operation, message } => {
            state.errors.insert(operation, Some(message));
            state.loading.insert(operation, false);
        }
        TaskAction::Settle(op) => settle(&mut state, op),
        TaskAction::FetchTasks(tasks) => {
            state.tasks = tasks;
            settle(&mut state, Operation::FetchTasks);
        }
        TaskAction::AddTask(task) => {
            state.tasks.push(task);
            settle(&mut state, Operation::AddTask);
        }
        TaskAction::ToggleTaskCompletion(id) => {
            for task in state.tasks.iter_mut().filter(|t| t.id == id) {
                task.completed = !task.completed;
            }
            settle(&mut state, Operation::ToggleTask);
        }
        TaskAction::DeleteTask(id) => {
            state.tasks.retain(|t| t.id != id);
            settle(&mut state, Operation::DeleteTask);
        }
        TaskAction::SetStateFromStorage(stored) => {
            state = AppState::with_tasks(stored.tasks);
        }
    }
    state
}

fn settle(state: &mut AppState, op: Operation) {
    state.loading.insert(op, false);
    state.errors.insert(op, None);
}

/// Id for a task created locally
///
/// The current time in milliseconds, bumped past every id already in
/// `tasks` so it can never collide with an existing task.
pub fn next_local_id(tasks: &[Task], now_millis: i64) -> TaskId {
    let max_existing = tasks.iter().map(|t| t.id).max().unwrap_or(0);
    now_millis.max(max_existing.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::with_tasks(vec![Task::new(1, "A", false), Task::new(2, "B", true)])
    }

    #[test]
    fn test_set_loading_only_touches_its_key() {
        let next = reduce(state(), TaskAction::SetLoading(Operation::AddTask));
        assert!(next.is_loading(Operation::AddTask));
        for op in Operation::ALL.into_iter().filter(|op| *op != Operation::AddTask) {
            assert!(!next.is_loading(op));
        }
        assert_eq!(next.tasks, state().tasks);
    }

    #[test]
    fn test_set_error_clears_loading() {
        let mut current = reduce(state(), TaskAction::SetLoading(Operation::DeleteTask));
        current = reduce(current, TaskAction::SetLoading(Operation::FetchTasks));
        let next = reduce(
            current,
            TaskAction::SetError {
                operation: Operation::DeleteTask,
                message: "boom".to_string(),
            },
        );

        assert!(!next.is_loading(Operation::DeleteTask));
        assert_eq!(next.error(Operation::DeleteTask), Some("boom"));
        // Other operations untouched
        assert!(next.is_loading(Operation::FetchTasks));
        assert!(next.error(Operation::FetchTasks).is_none());
    }

    #[test]
    fn test_success_clears_previous_error() {
        let failed = reduce(
            state(),
            TaskAction::SetError {
                operation: Operation::ToggleTask,
                message: "earlier failure".to_string(),
            },
        );
        let next = reduce(failed, TaskAction::ToggleTaskCompletion(1));
        assert!(next.error(Operation::ToggleTask).is_none());
        assert!(next.tasks[0].completed);
    }

    #[test]
    fn test_toggle_flips_by_id() {
        let next = reduce(state(), TaskAction::ToggleTaskCompletion(2));
        assert!(!next.tasks[0].completed);
        assert!(!next.tasks[1].completed);

        // Unknown id leaves tasks alone
        let next = reduce(next, TaskAction::ToggleTaskCompletion(99));
        assert!(!next.tasks[1].completed);
    }

    #[test]
    fn test_add_appends_and_delete_removes() {
        let next = reduce(state(), TaskAction::AddTask(Task::new(3, "C", false)));
        let ids: Vec<_> = next.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let next = reduce(next, TaskAction::DeleteTask(2));
        let ids: Vec<_> = next.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_fetch_replaces_everything() {
        let mut local = Task::new(500, "Local", false);
        local.is_created_locally = true;
        let current = reduce(state(), TaskAction::AddTask(local));

        let next = reduce(
            current,
            TaskAction::FetchTasks(vec![Task::new(7, "Fresh", false)]),
        );
        assert_eq!(next.tasks, vec![Task::new(7, "Fresh", false)]);
    }

    #[test]
    fn test_set_state_from_storage_resets_flags() {
        let mut stored = AppState::with_tasks(vec![Task::new(9, "Cached", true)]);
        stored.loading.insert(Operation::AddTask, true);
        stored
            .errors
            .insert(Operation::AddTask, Some("stale".to_string()));

        let current = reduce(state(), TaskAction::SetLoading(Operation::LoadFromStorage));
        let next = reduce(current, TaskAction::SetStateFromStorage(stored));

        assert_eq!(next.tasks, vec![Task::new(9, "Cached", true)]);
        assert_eq!(next, AppState::with_tasks(next.tasks.clone()));
    }

    #[test]
    fn test_is_commit() {
        assert!(TaskAction::DeleteTask(1).is_commit());
        assert!(TaskAction::FetchTasks(vec![]).is_commit());
        assert!(!TaskAction::SetLoading(Operation::FetchTasks).is_commit());
        assert!(!TaskAction::Settle(Operation::LoadFromStorage).is_commit());
        assert!(!TaskAction::SetError {
            operation: Operation::AddTask,
            message: String::new()
        }
        .is_commit());
    }

    #[test]
    fn test_next_local_id() {
        let tasks = vec![Task::new(1, "A", false), Task::new(255, "B", false)];
        assert_eq!(next_local_id(&tasks, 1_700_000_000_000), 1_700_000_000_000);

        // Clock behind an existing id
        let tasks = vec![Task::new(1_700_000_000_005, "Local", false)];
        assert_eq!(next_local_id(&tasks, 1_700_000_000_000), 1_700_000_000_006);

        assert_eq!(next_local_id(&[], 0), 1);
    }
}
