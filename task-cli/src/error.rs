use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the task operations and the stores backing them.
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was missing or empty
    #[error("{0}")]
    InvalidInput(String),
    /// The targeted task id does not exist in the collection
    #[error("Task with ID '{0}' not found. Please check the ID and try again.")]
    NotFound(String),
    /// The persisted file exists but does not hold a valid task collection
    #[error("Task file {} is corrupt: {reason}", path.display())]
    CorruptStore { path: PathBuf, reason: String },
    #[error("Unrecognized command '{0}'.")]
    UnrecognizedCommand(String),
    #[error("Cannot access task file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot serialize tasks")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
