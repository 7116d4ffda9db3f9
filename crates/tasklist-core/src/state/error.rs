//! Task operation errors
//!
//! These are recorded in the per-operation error slot of `AppState`; the
//! display string is what the UI layer shows.

use thiserror::Error;

use crate::models::TaskId;
use crate::remote::RemoteError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Remote source call failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// No task with this id in the current state
    #[error("Task with id:{id} is not found!")]
    NotFound { id: TaskId },
}
