//! A single-user task tracker that keeps its tasks in a local JSON file.
//!
//! [`TaskTracker`] exposes the task operations. It works on any [`TaskStore`],
//! usually a [`JsonFileStore`].

pub mod config;
pub mod error;
pub mod store;
pub mod task;
pub mod tracker;

pub use error::{Error, Result};
pub use store::{CorruptStorePolicy, JsonFileStore, MemoryStore, TaskStore};
pub use task::{Status, Task, TaskId, TaskList};
pub use tracker::TaskTracker;
