//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;
use tasklist_core::{AppState, Operation, Task};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single task with all its fields
    pub fn print_task(&self, task: &Task) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", task.id);
                println!("Title:     {}", task.title);
                println!(
                    "Status:    {}",
                    if task.completed { "done" } else { "open" }
                );
                println!(
                    "Origin:    {}",
                    if task.is_created_locally {
                        "local (not synced)"
                    } else {
                        "remote"
                    }
                );
            }
            OutputFormat::Json => print_json(task),
            OutputFormat::Quiet => println!("{}", task.id),
        }
    }

    /// Print the task list in display order
    pub fn print_tasks(&self, tasks: &[Task]) {
        match self.format {
            OutputFormat::Human => {
                if tasks.is_empty() {
                    println!("No tasks.");
                    return;
                }
                for task in tasks {
                    println!("{}", task_line(task));
                }
                let done = tasks.iter().filter(|t| t.completed).count();
                println!("\n{} task(s), {} done", tasks.len(), done);
            }
            OutputFormat::Json => print_json(tasks),
            OutputFormat::Quiet => {
                for task in tasks {
                    println!("{}", task.id);
                }
            }
        }
    }

    /// Print per-operation loading flags and last errors
    pub fn print_operations(&self, state: &AppState) {
        match self.format {
            OutputFormat::Human => {
                println!("Operations (this run):");
                for op in Operation::ALL {
                    let status = match (state.is_loading(op), state.error(op)) {
                        (true, _) => "loading".to_string(),
                        (false, Some(error)) => format!("error: {}", error),
                        (false, None) => "ok".to_string(),
                    };
                    println!("  {:<16} {}", op.as_str(), status);
                }
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                "loading": state.loading,
                "errors": state.errors,
            })),
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warning(&self, message: &str) {
        match self.format {
            OutputFormat::Quiet => {}
            _ => eprintln!("⚠ {}", message),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// One-line summary: checkbox, id, title, local marker
fn task_line(task: &Task) -> String {
    format!(
        "[{}] {:>13} | {}{}",
        if task.completed { "x" } else { " " },
        task.id,
        truncate(&task.title, 60),
        if task.is_created_locally { " (local)" } else { "" }
    )
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ääääääääääää", 5), "ää...");
    }

    #[test]
    fn test_task_line() {
        let mut task = Task::new(3, "Water plants", true);
        assert_eq!(task_line(&task), "[x]             3 | Water plants");

        task.completed = false;
        task.is_created_locally = true;
        assert!(task_line(&task).starts_with("[ ]"));
        assert!(task_line(&task).ends_with("Water plants (local)"));
    }
}
