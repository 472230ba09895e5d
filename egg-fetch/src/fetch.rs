//! Downloading an egg archive into the local cache, with md5 verification.

use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use egg_index::JoinedStore;
use log::{debug, info};
use md5::{Digest, Md5};

use crate::Error;

const CHUNK_SIZE: usize = 64 * 1024;

/// Receives `(bytes_so_far, total_bytes)` as a download progresses. `total_bytes` is the size
/// recorded in the store's metadata, known up front.
pub trait Progress {
    fn on_chunk(&mut self, bytes_so_far: u64, total_bytes: u64);
}

impl<F: FnMut(u64, u64)> Progress for F {
    fn on_chunk(&mut self, bytes_so_far: u64, total_bytes: u64) {
        self(bytes_so_far, total_bytes);
    }
}

fn file_md5(path: &Path) -> Result<String, Error> {
    let bytes = fs::read(path).map_err(|source| Error::IoPath { path: path.to_path_buf(), source })?;
    let mut hasher = Md5::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Downloads the archive identified by `key` from `store` into `cache_dir`, unless a file already
/// there has a matching md5 and `force` is false.
///
/// Writes to `<key>.part` and renames into place only after the downloaded bytes' md5 matches the
/// store's metadata (`spec.md` §4.G). On a mismatch the `.part` file is removed and
/// [`Error::Integrity`] is returned, leaving no final file behind.
///
/// # Errors
///
/// Returns [`Error::Integrity`] on an md5 mismatch, and propagates I/O and store errors.
pub fn fetch_egg(store: &JoinedStore, key: &str, cache_dir: &Path, force: bool, mut progress: impl Progress) -> Result<PathBuf, Error> {
    fs::create_dir_all(cache_dir).map_err(|source| Error::IoPath { path: cache_dir.to_path_buf(), source })?;
    let target = cache_dir.join(key);
    let record = store.get_metadata(key)?;

    if !force && target.exists() {
        if file_md5(&target)? == record.md5() {
            debug!("{key} already present in cache with matching md5, skipping download");
            return Ok(target);
        }
        debug!("{key} present in cache but md5 mismatch, re-downloading");
    }

    let part_path = cache_dir.join(format!("{key}.part"));
    let mut reader = store.get_data(key)?;
    let mut part_file = fs::File::create(&part_path).map_err(|source| Error::IoPath { path: part_path.clone(), source })?;

    let mut hasher = Md5::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    loop {
        let read = reader.read(&mut buffer).map_err(|source| Error::IoPath { path: part_path.clone(), source })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        part_file
            .write_all(&buffer[..read])
            .map_err(|source| Error::IoPath { path: part_path.clone(), source })?;
        written += read as u64;
        progress.on_chunk(written, record.size());
    }
    drop(part_file);

    let digest = format!("{:x}", hasher.finalize());
    if digest != record.md5() {
        let _ = fs::remove_file(&part_path);
        return Err(Error::Integrity(key.to_string()));
    }

    fs::rename(&part_path, &target).map_err(|source| Error::IoPath { path: target.clone(), source })?;
    info!("Fetched {key} into {}", cache_dir.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use egg_index::{IndexedStore, LocalIndexedStore};
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    fn store_with_egg(dir: &Path, content: &[u8], md5: &str) -> JoinedStore {
        std::fs::write(dir.join("foo-1.0.0-1.egg"), content).unwrap();
        std::fs::write(
            dir.join("index-depend.txt"),
            format!(
                "==> foo-1.0.0-1.egg <==\nname = 'foo'\nversion = '1.0.0'\nbuild = 1\nmd5 = '{md5}'\nsize = {}\n",
                content.len()
            ),
        )
        .unwrap();
        let mut joined = JoinedStore::new(vec![IndexedStore::LocalIndexed(LocalIndexedStore::new(dir))]);
        joined.connect();
        joined
    }

    #[test]
    fn fetch_verifies_and_renames_into_place() -> TestResult {
        let repo = tempdir()?;
        let cache = tempdir()?;
        let content = b"egg bytes";
        let md5 = file_md5_of(content);
        let store = store_with_egg(repo.path(), content, &md5);

        let mut progressed = Vec::new();
        let path = fetch_egg(&store, "foo-1.0.0-1.egg", cache.path(), false, |done, total| progressed.push((done, total)))?;
        assert!(path.exists());
        assert!(!progressed.is_empty());
        assert!(!cache.path().join("foo-1.0.0-1.egg.part").exists());
        Ok(())
    }

    #[test]
    fn fetch_is_idempotent_when_cached_md5_matches() -> TestResult {
        let repo = tempdir()?;
        let cache = tempdir()?;
        let content = b"egg bytes";
        let md5 = file_md5_of(content);
        let store = store_with_egg(repo.path(), content, &md5);

        fetch_egg(&store, "foo-1.0.0-1.egg", cache.path(), false, |_, _| {})?;
        // Second call must not error and must leave the same file in place.
        let path = fetch_egg(&store, "foo-1.0.0-1.egg", cache.path(), false, |_, _| {})?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn mismatched_md5_is_an_integrity_error_and_leaves_no_part_file() {
        let repo = tempdir().unwrap();
        let cache = tempdir().unwrap();
        let content = b"egg bytes";
        let store = store_with_egg(repo.path(), content, "00000000000000000000000000000000");

        let result = fetch_egg(&store, "foo-1.0.0-1.egg", cache.path(), false, |_, _| {});
        assert!(result.is_err());
        assert!(!cache.path().join("foo-1.0.0-1.egg.part").exists());
        assert!(!cache.path().join("foo-1.0.0-1.egg").exists());
    }

    fn file_md5_of(bytes: &[u8]) -> String {
        let mut hasher = Md5::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }
}
