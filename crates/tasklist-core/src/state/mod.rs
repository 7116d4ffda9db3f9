//! Task state container
//!
//! Reducer over [`TaskAction`]s plus the [`TaskStore`] that orchestrates
//! remote calls and persistence around it.

mod action;
mod error;
mod store;

pub use action::{next_local_id, reduce, TaskAction};
pub use error::TaskError;
pub use store::{TaskStore, TaskStoreOptions};
