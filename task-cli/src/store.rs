//! Persistence for the task collection.
//!
//! A store always loads and saves the whole collection. Nothing locks the
//! backing file: two processes working on the same file concurrently race,
//! the last one to save wins and the other's change is lost.

use crate::error::{Error, Result};
use crate::task::TaskList;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default file name of the persisted collection.
pub const TASK_FILE: &str = "tasks.json";

const TMP_SUFFIX: &str = ".tmp";
const CORRUPT_SUFFIX: &str = ".corrupt";

/// Load and save the complete task collection.
#[cfg_attr(test, mockall::automock)]
pub trait TaskStore {
    /// Loads the full collection, creating an empty one if nothing was persisted yet.
    fn load(&self) -> Result<TaskList>;

    /// Replaces the persisted collection with `tasks`.
    fn save(&self, tasks: &TaskList) -> Result<()>;
}

/// What to do with a task file that cannot be parsed.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptStorePolicy {
    /// Move the corrupt file aside, then start over with an empty collection
    #[default]
    Backup,
    /// Overwrite the corrupt file with an empty collection
    Reset,
    /// Leave the corrupt file untouched
    Keep,
}

/// Stores the collection as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        sibling(&self.path, TMP_SUFFIX)
    }

    /// Applies `policy` to a corrupt task file.
    ///
    /// Returns where the corrupt contents were moved to, if they were kept.
    pub fn recover(&self, policy: CorruptStorePolicy) -> Result<Option<PathBuf>> {
        match policy {
            CorruptStorePolicy::Keep => {
                debug!(path = %self.path.display(), "leaving corrupt task file in place");
                Ok(None)
            }
            CorruptStorePolicy::Reset => {
                warn!(path = %self.path.display(), "discarding corrupt task file");
                self.save(&TaskList::new())?;
                Ok(None)
            }
            CorruptStorePolicy::Backup => {
                let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
                let backup = sibling(&self.path, &format!("{CORRUPT_SUFFIX}-{stamp}"));
                fs::rename(&self.path, &backup).map_err(|e| Error::io(&self.path, e))?;
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    "moved corrupt task file aside"
                );
                self.save(&TaskList::new())?;
                Ok(Some(backup))
            }
        }
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<TaskList> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no task file yet, creating an empty one");
                let tasks = TaskList::new();
                self.save(&tasks)?;
                return Ok(tasks);
            }
            Err(e) => return Err(Error::io(&self.path, e)),
        };

        let tasks: TaskList =
            serde_json::from_str(&contents).map_err(|e| Error::CorruptStore {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn save(&self, tasks: &TaskList) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(tasks)?;
        let tmp_path = self.tmp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(json.as_bytes())?;
            tmp_file.sync_all()
        };
        let replaced = write_tmp()
            .map_err(|e| Error::io(&tmp_path, e))
            .and_then(|()| fs::rename(&tmp_path, &self.path).map_err(|e| Error::io(&self.path, e)));
        if replaced.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        replaced?;

        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Keeps the collection in memory. Useful for tests and for embedding the tracker.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: RefCell<TaskList>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: TaskList) -> Self {
        Self {
            tasks: RefCell::new(tasks),
            saves: Cell::new(0),
        }
    }

    /// Number of times the collection has been saved.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<TaskList> {
        Ok(self.tasks.borrow().clone())
    }

    fn save(&self, tasks: &TaskList) -> Result<()> {
        *self.tasks.borrow_mut() = tasks.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
