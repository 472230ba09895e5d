//! Error handling for egg-history.

use std::path::PathBuf;

/// An error that can occur while reading, appending to, or querying a history log.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O operation on `path` failed.
    #[error("I/O error at {path}: {source}")]
    IoPath { path: PathBuf, source: std::io::Error },

    /// A log entry could not be parsed.
    #[error("Malformed history entry: {detail}")]
    Parse { detail: String },

    /// `get_state` found no revision matching the request.
    #[error("No such revision: {0}")]
    NoSuchRevision(String),

    /// An egg filename recorded in the log failed validation.
    #[error(transparent)]
    Types(#[from] egg_types::Error),
}
