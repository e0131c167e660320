//! Errors raised by the task store and the command line driver.
//!
//! The reset engine itself has no failure modes.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot access task file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse task file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected layout in task file {path}: {reason}")]
    Format { path: PathBuf, reason: String },
    #[error("no task with id {0}")]
    TaskNotFound(String),
    #[error("invalid --now instant {0:?}, expected RFC 3339 such as 2024-03-08T09:00:00+01:00")]
    InvalidInstant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
