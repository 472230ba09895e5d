//! The joined store: an ordered union of stores with first-match-wins precedence.

use std::collections::BTreeSet;

use egg_types::PackageMetadata;
use log::warn;

use crate::{Error, store::IndexedStore};

/// An ordered chain of [`IndexedStore`]s.
///
/// `query` yields results from every reachable store, with duplicate keys suppressed in favor of
/// the earliest store that has them. A store whose `connect` fails is demoted to empty for the
/// session rather than aborting the whole chain (`spec.md` §4.D).
#[derive(Debug)]
pub struct JoinedStore {
    stores: Vec<IndexedStore>,
    unavailable: Vec<bool>,
}

impl JoinedStore {
    /// Builds a joined store from an ordered list of backends.
    pub fn new(stores: Vec<IndexedStore>) -> Self {
        let unavailable = vec![false; stores.len()];
        JoinedStore { stores, unavailable }
    }

    /// Connects every child store, demoting any that fail.
    ///
    /// This never itself returns an error: a store that cannot be reached is recorded as
    /// unavailable and simply contributes nothing to subsequent queries.
    pub fn connect(&mut self) {
        for (store, unavailable) in self.stores.iter_mut().zip(self.unavailable.iter_mut()) {
            if let Err(err) = store.connect() {
                warn!("Store unavailable, demoting to empty for this session: {err}");
                *unavailable = true;
            }
        }
    }

    fn reachable(&self) -> impl Iterator<Item = &IndexedStore> {
        self.stores
            .iter()
            .zip(self.unavailable.iter())
            .filter(|(_, unavailable)| !**unavailable)
            .map(|(store, _)| store)
    }

    /// Returns every record matching `name` across all reachable stores, first-store-wins on
    /// duplicate keys.
    pub fn query(&self, name: Option<&str>) -> Vec<(String, PackageMetadata)> {
        let mut seen = BTreeSet::new();
        let mut results = Vec::new();
        for store in self.reachable() {
            for (key, record) in store.query(name) {
                if seen.insert(key.to_string()) {
                    results.push((key.to_string(), record.clone()));
                }
            }
        }
        results
    }

    /// Returns the first reachable store's record for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if no reachable store has `key`.
    pub fn get_metadata(&self, key: &str) -> Result<PackageMetadata, Error> {
        self.reachable()
            .find_map(|store| store.get_metadata(key).cloned())
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Opens a byte stream for `key` from the first reachable store that has it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if no reachable store has `key`.
    pub fn get_data(&self, key: &str) -> Result<Box<dyn std::io::Read>, Error> {
        for store in self.reachable() {
            if store.exists(key) {
                return store.get_data(key);
            }
        }
        Err(Error::KeyNotFound(key.to_string()))
    }

    /// Returns whether any reachable store has `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.reachable().any(|store| store.exists(key))
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use tempfile::tempdir;

    use super::*;
    use crate::store::LocalIndexedStore;

    fn write_index(dir: &std::path::Path, contents: &str) {
        let mut file = fs::File::create(dir.join("index-depend.txt")).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn first_store_wins_on_duplicate_keys() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        write_index(
            first.path(),
            "==> foo-1.0.0-1.egg <==\nname = 'foo'\nversion = '1.0.0'\nbuild = 1\nmd5 = 'd41d8cd98f00b204e9800998ecf8427e'\nsize = 1\n",
        );
        write_index(
            second.path(),
            "==> foo-1.0.0-1.egg <==\nname = 'foo'\nversion = '1.0.0'\nbuild = 1\nmd5 = '11111111111111111111111111111111'\nsize = 2\n",
        );

        let mut joined = JoinedStore::new(vec![
            IndexedStore::LocalIndexed(LocalIndexedStore::new(first.path())),
            IndexedStore::LocalIndexed(LocalIndexedStore::new(second.path())),
        ]);
        joined.connect();

        let record = joined.get_metadata("foo-1.0.0-1.egg").unwrap();
        assert_eq!(record.size(), 1);
    }

    #[test]
    fn unreachable_store_is_demoted_not_fatal() {
        let missing = tempdir().unwrap().path().join("does-not-exist");
        let mut joined = JoinedStore::new(vec![IndexedStore::LocalIndexed(LocalIndexedStore::new(missing))]);
        joined.connect();
        assert!(!joined.exists("foo-1.0.0-1.egg"));
    }
}
