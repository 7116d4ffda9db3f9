//! Translation between remote todos and local tasks
//!
//! Pure functions with no failure modes.

use crate::models::{Task, Todo};

/// Map a remote todo to a remote-sourced task
pub fn todo_to_task(todo: Todo) -> Task {
    Task {
        id: todo.id,
        title: todo.todo,
        completed: todo.completed,
        is_created_locally: false,
    }
}

/// Copy of `task` flagged as created locally
pub fn mark_created_locally(task: Task) -> Task {
    Task {
        is_created_locally: true,
        ..task
    }
}

/// Order-preserving map of todos to tasks
pub fn todos_to_tasks(todos: Vec<Todo>) -> Vec<Task> {
    todos.into_iter().map(todo_to_task).collect()
}

/// Map a task back to the remote shape, with the mocked owner id
pub fn task_to_todo(task: &Task, owner_id: i64) -> Todo {
    Todo {
        id: task.id,
        todo: task.title.clone(),
        completed: task.completed,
        user_id: owner_id,
    }
}

pub fn tasks_to_todos(tasks: &[Task], owner_id: i64) -> Vec<Todo> {
    tasks.iter().map(|t| task_to_todo(t, owner_id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: i64, text: &str, completed: bool) -> Todo {
        Todo {
            id,
            todo: text.to_string(),
            completed,
            user_id: 1,
        }
    }

    #[test]
    fn test_todo_to_task() {
        let task = todo_to_task(todo(4, "Read", true));
        assert_eq!(task, Task::new(4, "Read", true));
        assert!(!task.is_created_locally);
    }

    #[test]
    fn test_mark_created_locally_keeps_fields() {
        let task = mark_created_locally(Task::new(9, "Cook", false));
        assert!(task.is_created_locally);
        assert_eq!(task.id, 9);
        assert_eq!(task.title, "Cook");
        assert!(!task.completed);
    }

    #[test]
    fn test_todos_to_tasks_preserves_order() {
        let tasks = todos_to_tasks(vec![todo(3, "C", false), todo(1, "A", true), todo(2, "B", false)]);
        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_task_to_todo_uses_owner() {
        let mut task = Task::new(5, "Run", false);
        task.is_created_locally = true;
        let todo = task_to_todo(&task, 42);
        assert_eq!(todo.id, 5);
        assert_eq!(todo.todo, "Run");
        assert_eq!(todo.user_id, 42);

        let todos = tasks_to_todos(&[task.clone(), Task::new(6, "Swim", true)], 1);
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[1].todo, "Swim");
    }
}
