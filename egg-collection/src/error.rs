//! Error handling for egg-collection.

use std::path::PathBuf;

/// An error that can occur while installing, removing or querying a per-prefix egg collection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O operation on `path` failed.
    #[error("I/O error at {path}: {source}")]
    IoPath { path: PathBuf, source: std::io::Error },

    /// `remove` was called for an egg that is not installed.
    #[error("Not installed: {0}")]
    NotInstalled(String),

    /// The collection could not acquire its lock file, meaning another process holds it.
    #[error("Collection at {0} is locked by another process")]
    Locked(PathBuf),

    /// Reading or unpacking an egg archive failed.
    #[error("Failed to unpack archive {path}: {detail}")]
    Archive { path: PathBuf, detail: String },

    /// A sidecar metadata file was unreadable or malformed.
    #[error("Malformed sidecar at {path}: {source}")]
    Sidecar { path: PathBuf, source: serde_json::Error },

    /// A name, version or filename component failed validation.
    #[error(transparent)]
    Types(#[from] egg_types::Error),
}
