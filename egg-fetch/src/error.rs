//! Error handling for egg-fetch.

use std::path::PathBuf;

/// An error that can occur while fetching an egg archive into the local cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O operation on `path` failed.
    #[error("I/O error at {path}: {source}")]
    IoPath { path: PathBuf, source: std::io::Error },

    /// The downloaded archive's md5 digest did not match the store's metadata.
    #[error("Integrity check failed for {0}")]
    Integrity(String),

    /// The store could not be queried or did not have the requested key.
    #[error(transparent)]
    Index(#[from] egg_index::Error),
}
