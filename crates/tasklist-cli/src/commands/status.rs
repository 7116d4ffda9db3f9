//! Status command handler

use anyhow::Result;

use tasklist_core::{Config, TaskStore};

use crate::output::{Output, OutputFormat};

/// Show storage, remote and per-operation status
pub fn show(store: &TaskStore, config: &Config, output: &Output) -> Result<()> {
    let state = store.snapshot();
    let total = state.tasks.len();
    let done = state.tasks.iter().filter(|t| t.completed).count();
    let local = state.local_task_count();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "storage": {
                        "backend": config.storage_backend.to_string(),
                        "data_dir": config.data_dir,
                    },
                    "counts": {
                        "tasks": total,
                        "completed": done,
                        "local": local,
                    },
                    "loading": state.loading,
                    "errors": state.errors,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", total);
        }
        OutputFormat::Human => {
            println!("Tasklist Status");
            println!("===============");
            println!();
            println!("Remote:");
            println!("  API: {}", config.api_url);
            println!();
            println!("Storage:");
            println!("  Backend:  {}", config.storage_backend);
            println!("  Location: {}", config.data_dir.display());
            println!();
            println!("Contents:");
            println!("  Tasks:     {}", total);
            println!("  Completed: {}", done);
            println!("  Local:     {}", local);
            println!();
            output.print_operations(&state);
        }
    }

    Ok(())
}
