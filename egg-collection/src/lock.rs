//! A file-based lock preventing two collections from touching the same prefix at once.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use crate::Error;

const LOCK_FILE_NAME: &str = "eggs.lck";

/// Holds an exclusive lock on a collection's sidecar directory for as long as it lives.
#[derive(Debug)]
pub struct CollectionLock {
    path: PathBuf,
    _file: std::fs::File,
}

impl CollectionLock {
    /// Acquires the lock for the collection rooted at `meta_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] if another live collection already holds the lock.
    pub fn acquire(meta_dir: &Path) -> Result<Self, Error> {
        let path = meta_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|_| Error::Locked(path.clone()))?;
        Ok(CollectionLock { path, _file: file })
    }
}

impl Drop for CollectionLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
