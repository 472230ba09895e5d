//! Per-prefix view of installed eggs.

use std::{
    collections::BTreeMap,
    fs::{self, create_dir_all},
    io::Read,
    path::{Path, PathBuf},
};

use egg_types::{EggFilename, EggName, PackageMetadata};
use log::{debug, info};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, entry::InstalledEntry, lock::CollectionLock};

const META_DIR_NAME: &str = "EGG-META";

fn filename_stem(filename: &EggFilename) -> String {
    filename.to_string().trim_end_matches(".egg").to_string()
}

/// A per-prefix collection of installed eggs.
///
/// Two layout modes: **plain**, where only one version of a given name may be installed and its
/// files land directly under the prefix, and **hook**, where each egg is unpacked into its own
/// per-version directory so multiple versions can coexist (`spec.md` §4.F).
#[derive(Clone, Debug)]
pub struct EggCollection {
    prefix: PathBuf,
    hook: bool,
}

impl EggCollection {
    /// Creates a view over the collection rooted at `prefix`.
    pub fn new(prefix: impl Into<PathBuf>, hook: bool) -> Self {
        EggCollection { prefix: prefix.into(), hook }
    }

    /// Returns the prefix this collection manages.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    fn meta_root(&self) -> PathBuf {
        self.prefix.join(META_DIR_NAME)
    }

    fn meta_dir_for(&self, filename: &EggFilename) -> PathBuf {
        self.meta_root().join(filename_stem(filename))
    }

    fn unpack_dir_for(&self, filename: &EggFilename) -> PathBuf {
        if self.hook {
            self.prefix.join("hook").join(filename_stem(filename))
        } else {
            self.prefix.clone()
        }
    }

    /// Unpacks the archive `source_archive` (a path to a `.egg` zip) and records `record` as
    /// newly installed, with `ctime` set to the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Archive`] if the zip cannot be read, and propagates filesystem errors.
    pub fn install(&self, record: PackageMetadata, source_archive: &Path) -> Result<InstalledEntry, Error> {
        let filename = record.filename();
        let meta_dir = self.meta_dir_for(&filename);
        create_dir_all(self.meta_root()).map_err(|source| Error::IoPath { path: self.meta_root(), source })?;
        let _lock = CollectionLock::acquire(&self.meta_root())?;
        create_dir_all(&meta_dir).map_err(|source| Error::IoPath { path: meta_dir.clone(), source })?;

        let unpack_dir = self.unpack_dir_for(&filename);
        let files = unpack_archive(source_archive, &unpack_dir)?;

        let ctime = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        let entry = InstalledEntry::new(record, ctime, self.hook, meta_dir, files);
        entry.write_sidecar()?;
        info!("Installed {} into {}", entry.record().filename(), self.prefix.display());
        Ok(entry)
    }

    /// Removes an installed egg: its unpacked files and its sidecar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInstalled`] if `filename` is not currently installed.
    pub fn remove(&self, filename: &EggFilename) -> Result<(), Error> {
        let meta_dir = self.meta_dir_for(filename);
        if !meta_dir.exists() {
            return Err(Error::NotInstalled(filename.to_string()));
        }
        let _lock = CollectionLock::acquire(&self.meta_root())?;
        let entry = InstalledEntry::read_sidecar(&meta_dir)?;
        for file in entry.files() {
            if let Err(source) = fs::remove_file(file) {
                if source.kind() != std::io::ErrorKind::NotFound {
                    debug!("Failed to remove {}: {source}", file.display());
                }
            }
        }
        fs::remove_dir_all(&meta_dir).map_err(|source| Error::IoPath { path: meta_dir, source })?;
        info!("Removed {filename} from {}", self.prefix.display());
        Ok(())
    }

    /// Returns every installed entry, optionally filtered by name.
    pub fn query(&self, name: Option<&EggName>) -> Vec<InstalledEntry> {
        let Ok(dirs) = fs::read_dir(self.meta_root()) else {
            return Vec::new();
        };
        let mut entries = Vec::new();
        for dir in dirs.flatten() {
            let Ok(entry) = InstalledEntry::read_sidecar(&dir.path()) else { continue };
            if name.is_none_or(|name| entry.record().name() == name) {
                entries.push(entry);
            }
        }
        entries
    }

    /// Returns the installed entry for `filename`, if present.
    pub fn find(&self, filename: &EggFilename) -> Option<InstalledEntry> {
        let meta_dir = self.meta_dir_for(filename);
        InstalledEntry::read_sidecar(&meta_dir).ok()
    }
}

fn unpack_archive(source_archive: &Path, destination: &Path) -> Result<Vec<PathBuf>, Error> {
    let file = fs::File::open(source_archive).map_err(|source| Error::IoPath { path: source_archive.to_path_buf(), source })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| Error::Archive {
        path: source_archive.to_path_buf(),
        detail: err.to_string(),
    })?;

    let mut written = Vec::new();
    for index in 0..archive.len() {
        let mut member = archive.by_index(index).map_err(|err| Error::Archive {
            path: source_archive.to_path_buf(),
            detail: err.to_string(),
        })?;
        let Some(relative) = member.enclosed_name() else { continue };
        let target = destination.join(relative);
        if member.is_dir() {
            create_dir_all(&target).map_err(|source| Error::IoPath { path: target, source })?;
            continue;
        }
        if let Some(parent) = target.parent() {
            create_dir_all(parent).map_err(|source| Error::IoPath { path: parent.to_path_buf(), source })?;
        }
        let mut contents = Vec::new();
        member.read_to_end(&mut contents).map_err(|err| Error::Archive {
            path: source_archive.to_path_buf(),
            detail: err.to_string(),
        })?;
        fs::write(&target, contents).map_err(|source| Error::IoPath { path: target.clone(), source })?;
        written.push(target);
    }
    Ok(written)
}

/// A union of collections across several prefixes: writes always target the first (primary)
/// collection, reads see the union with first-prefix precedence.
#[derive(Clone, Debug)]
pub struct JoinedEggCollection {
    primary: EggCollection,
    others: Vec<EggCollection>,
}

impl JoinedEggCollection {
    /// Builds a joined view with `primary` as the write target.
    pub fn new(primary: EggCollection, others: Vec<EggCollection>) -> Self {
        JoinedEggCollection { primary, others }
    }

    /// Returns the primary (write target) collection.
    pub fn primary(&self) -> &EggCollection {
        &self.primary
    }

    /// Installs into the primary collection.
    ///
    /// # Errors
    ///
    /// See [`EggCollection::install`].
    pub fn install(&self, record: PackageMetadata, source_archive: &Path) -> Result<InstalledEntry, Error> {
        self.primary.install(record, source_archive)
    }

    /// Removes from the primary collection.
    ///
    /// # Errors
    ///
    /// See [`EggCollection::remove`].
    pub fn remove(&self, filename: &EggFilename) -> Result<(), Error> {
        self.primary.remove(filename)
    }

    /// Returns the union of every collection's entries for `name`, primary-first, deduplicated by
    /// egg filename.
    pub fn query(&self, name: Option<&EggName>) -> Vec<InstalledEntry> {
        let mut seen = BTreeMap::new();
        for entry in self.primary.query(name) {
            seen.entry(entry.record().filename().to_string()).or_insert(entry);
        }
        for collection in &self.others {
            for entry in collection.query(name) {
                seen.entry(entry.record().filename().to_string()).or_insert(entry);
            }
        }
        seen.into_values().collect()
    }

    /// Looks `filename` up across every collection, primary first.
    pub fn find(&self, filename: &EggFilename) -> Option<InstalledEntry> {
        self.primary.find(filename).or_else(|| self.others.iter().find_map(|c| c.find(filename)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    fn make_egg(path: &Path, member: &str, contents: &[u8]) -> TestResult {
        let file = fs::File::create(path)?;
        let mut writer = zip::ZipWriter::new(file);
        writer.start_file(member, zip::write::FileOptions::default())?;
        writer.write_all(contents)?;
        writer.finish()?;
        Ok(())
    }

    fn record(name: &str, version: &str, build: u32) -> PackageMetadata {
        PackageMetadata::builder(name, version, build)
            .md5("d41d8cd98f00b204e9800998ecf8427e")
            .size(1)
            .build()
            .unwrap()
    }

    #[test]
    fn install_then_remove_round_trips() -> TestResult {
        let prefix = tempdir()?;
        let archive_dir = tempdir()?;
        let archive_path = archive_dir.path().join("foo-1.0.0-1.egg");
        make_egg(&archive_path, "foo/__init__.py", b"# foo")?;

        let collection = EggCollection::new(prefix.path(), false);
        let installed = collection.install(record("foo", "1.0.0", 1), &archive_path)?;
        assert_eq!(installed.files().len(), 1);
        assert!(installed.files()[0].exists());

        let found = collection.find(&record("foo", "1.0.0", 1).filename());
        assert!(found.is_some());

        collection.remove(&record("foo", "1.0.0", 1).filename())?;
        assert!(!installed.files()[0].exists());
        assert!(collection.find(&record("foo", "1.0.0", 1).filename()).is_none());
        Ok(())
    }

    #[test]
    fn remove_of_not_installed_is_an_error() {
        let prefix = tempdir().unwrap();
        let collection = EggCollection::new(prefix.path(), false);
        assert!(collection.remove(&record("foo", "1.0.0", 1).filename()).is_err());
    }

    #[test]
    fn joined_collection_writes_go_to_primary() -> TestResult {
        let primary_dir = tempdir()?;
        let other_dir = tempdir()?;
        let archive_dir = tempdir()?;
        let archive_path = archive_dir.path().join("foo-1.0.0-1.egg");
        make_egg(&archive_path, "foo/__init__.py", b"# foo")?;

        let primary = EggCollection::new(primary_dir.path(), false);
        let other = EggCollection::new(other_dir.path(), false);
        let joined = JoinedEggCollection::new(primary.clone(), vec![other]);

        joined.install(record("foo", "1.0.0", 1), &archive_path)?;
        assert!(primary.find(&record("foo", "1.0.0", 1).filename()).is_some());
        assert_eq!(joined.query(None).len(), 1);
        Ok(())
    }
}
