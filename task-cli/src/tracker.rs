//! Task operations over a [`TaskStore`].
//!
//! Every operation loads the whole collection first. Operations that change
//! something save the whole collection back; read-only operations and
//! operations that fail never save.

use crate::error::Result;
use crate::store::TaskStore;
use crate::task::{Status, Task, TaskId, TaskList};
use tracing::info;

pub struct TaskTracker<'a, STORE: TaskStore> {
    store: &'a STORE,
}

impl<'a, STORE: TaskStore> TaskTracker<'a, STORE> {
    pub fn new(store: &'a STORE) -> Self {
        Self { store }
    }

    /// Adds a pending task and returns its freshly generated id.
    ///
    /// Fails with `InvalidInput` when the description is blank.
    #[tracing::instrument(skip(self))]
    pub fn add(&self, description: &str) -> Result<TaskId> {
        let mut tasks = self.store.load()?;
        let id = tasks.add(description)?;
        self.store.save(&tasks)?;
        info!(%id, "task added");
        Ok(id)
    }

    /// Replaces the description of the task with `id`.
    #[tracing::instrument(skip(self))]
    pub fn update(&self, id: &TaskId, description: &str) -> Result<()> {
        self.mutate(id, |tasks| tasks.update_description(id, description))
    }

    /// Removes the task with `id` and returns it.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: &TaskId) -> Result<Task> {
        let mut tasks = self.store.load()?;
        let removed = tasks.remove(id)?;
        self.store.save(&tasks)?;
        info!(%id, "task deleted");
        Ok(removed)
    }

    #[tracing::instrument(skip(self))]
    pub fn mark_in_progress(&self, id: &TaskId) -> Result<()> {
        self.mutate(id, |tasks| tasks.set_status(id, Status::InProgress))
    }

    #[tracing::instrument(skip(self))]
    pub fn mark_done(&self, id: &TaskId) -> Result<()> {
        self.mutate(id, |tasks| tasks.set_status(id, Status::Done))
    }

    /// Returns every task in insertion order.
    pub fn list_all(&self) -> Result<Vec<Task>> {
        Ok(self.store.load()?.iter().cloned().collect())
    }

    /// Returns the tasks whose status is `status`, in insertion order.
    pub fn list_by_status(&self, status: Status) -> Result<Vec<Task>> {
        Ok(self.store.load()?.with_status(status).cloned().collect())
    }

    fn mutate<F>(&self, id: &TaskId, change: F) -> Result<()>
    where
        F: FnOnce(&mut TaskList) -> Result<bool>,
    {
        let mut tasks = self.store.load()?;
        if change(&mut tasks)? {
            self.store.save(&tasks)?;
            info!(%id, "task updated");
        } else {
            info!(%id, "task already up to date, nothing to save");
        }
        Ok(())
    }
}
