//! Task command handlers
//!
//! Each handler invokes one store operation and renders the result. Failures
//! are already recorded in the store's error slot; they are returned here so
//! the process exits non-zero.

use anyhow::{anyhow, Context, Result};

use tasklist_core::{normalize_title, TaskId, TaskStore};

use crate::output::Output;

/// List all tasks
pub fn list(store: &TaskStore, output: &Output) -> Result<()> {
    output.print_tasks(&store.tasks());
    Ok(())
}

/// Show a single task
pub fn show(store: &TaskStore, id: TaskId, output: &Output) -> Result<()> {
    let task = store
        .find_task(id)
        .ok_or_else(|| anyhow!("Task not found: {}", id))?;
    output.print_task(&task);
    Ok(())
}

/// Add a task; words are joined with spaces
pub async fn add(store: &TaskStore, words: Vec<String>, output: &Output) -> Result<()> {
    let title = normalize_title(&words.join(" "))
        .ok_or_else(|| anyhow!("Task title cannot be empty"))?;

    let id = store
        .add_task(&title)
        .await
        .context("Failed to add task")?;

    output.success(&format!("Added task: {}", id));
    if let Some(task) = store.find_task(id) {
        output.print_task(&task);
    }
    Ok(())
}

/// Toggle a task's completed flag
pub async fn toggle(store: &TaskStore, id: TaskId, output: &Output) -> Result<()> {
    store
        .toggle_task_completion(id)
        .await
        .context("Failed to toggle task")?;

    match store.find_task(id) {
        Some(task) if task.completed => output.success(&format!("Completed task: {}", id)),
        Some(_) => output.success(&format!("Reopened task: {}", id)),
        None => output.success(&format!("Toggled task: {}", id)),
    }
    Ok(())
}

/// Delete a task
pub async fn delete(store: &TaskStore, id: TaskId, output: &Output) -> Result<()> {
    store
        .delete_task(id)
        .await
        .context("Failed to delete task")?;

    output.success(&format!("Deleted task: {}", id));
    Ok(())
}

/// Replace the local list with the remote one
pub async fn fetch(store: &TaskStore, output: &Output) -> Result<()> {
    let replaced = replace_with_remote(store).await?;

    if replaced > 0 {
        output.warning(&format!(
            "{} locally created task(s) were replaced by the remote list",
            replaced
        ));
    }
    output.success(&format!("Fetched {} task(s)", store.tasks().len()));
    Ok(())
}

/// Adopt the cache, then fetch; returns how many local tasks were dropped
async fn replace_with_remote(store: &TaskStore) -> Result<usize> {
    store.restore_from_storage().await;
    let local_before = store.snapshot().local_task_count();

    store
        .fetch_tasks()
        .await
        .context("Failed to fetch tasks")?;

    Ok(local_before)
}
