//! The top-level facade: `spec.md` §4.J, grounded on `enpkg.py`'s `Enpkg` class.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use egg_collection::{EggCollection, InstalledEntry, JoinedEggCollection};
use egg_exec::{Action, ProgressSink};
use egg_history::{HistoryLog, Revision};
use egg_index::JoinedStore;
use egg_resolve::Mode;
use egg_types::{EggFilename, EggName, PackageMetadata, Requirement};
use log::info;

use crate::Error;

/// Ties the repository chain, resolver, per-prefix collection, fetcher, executor and history
/// together behind the surface the CLI (or any other client) drives.
#[derive(Debug)]
pub struct Facade {
    store: JoinedStore,
    collection: JoinedEggCollection,
    history: HistoryLog,
    cache_dir: PathBuf,
    hook: bool,
}

impl Facade {
    /// Builds a facade over `store` (not yet connected) and a collection rooted at `primary_prefix`
    /// with any `other_prefixes` unioned in for reads.
    pub fn new(store: JoinedStore, primary_prefix: impl AsRef<Path>, other_prefixes: &[PathBuf], hook: bool) -> Self {
        let primary_prefix = primary_prefix.as_ref();
        let primary = EggCollection::new(primary_prefix, hook);
        let others = other_prefixes.iter().map(|prefix| EggCollection::new(prefix, hook)).collect();
        Facade {
            store,
            collection: JoinedEggCollection::new(primary, others),
            history: HistoryLog::new(primary_prefix),
            cache_dir: primary_prefix.join("LOCAL-REPO"),
            hook,
        }
    }

    /// Connects the repository chain, demoting any unreachable store. Idempotent.
    pub fn connect(&mut self) {
        self.store.connect();
    }

    /// Returns every remote record matching `name`, if given.
    pub fn query_remote(&self, name: Option<&str>) -> Vec<(String, PackageMetadata)> {
        self.store.query(name)
    }

    /// Returns every installed entry matching `name`, if given.
    pub fn query_installed(&self, name: Option<&EggName>) -> Vec<InstalledEntry> {
        self.collection.query(name)
    }

    /// Returns the union of remote and installed records for `name`, installed entries winning
    /// over remote ones of the same key (`original_source/enstaller/enpkg.py`'s `query`).
    pub fn query(&self, name: Option<&str>) -> Vec<(String, PackageMetadata)> {
        let mut merged: BTreeMap<String, PackageMetadata> = self.query_remote(name).into_iter().collect();
        let egg_name = name.and_then(|name| EggName::new(name).ok());
        for entry in self.query_installed(egg_name.as_ref()) {
            merged.insert(entry.record().filename().to_string(), entry.record().clone());
        }
        merged.into_iter().collect()
    }

    fn installed_filename_for(&self, name: &EggName) -> Option<EggFilename> {
        self.collection.primary().query(Some(name)).into_iter().next().map(|entry| entry.record().filename())
    }

    /// Computes the plan for installing `req`, without executing it.
    ///
    /// See `spec.md` §4.H/§4.J for the force/forceall semantics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolve`] if resolution fails.
    pub fn install_actions(&self, req: &Requirement, mode: Mode, force: bool, forceall: bool) -> Result<Vec<Action>, Error> {
        let order = egg_resolve::install_sequence(req, &self.store, mode)?;

        let to_process: Vec<EggFilename> = if forceall {
            order.clone()
        } else if force {
            let split_at = order.len().saturating_sub(1);
            let (deps, leaf) = order.split_at(split_at);
            let mut filtered: Vec<EggFilename> =
                deps.iter().filter(|filename| self.collection.find(filename).is_none()).cloned().collect();
            filtered.extend_from_slice(leaf);
            filtered
        } else {
            order.iter().filter(|filename| self.collection.find(filename).is_none()).cloned().collect()
        };

        let mut actions = Vec::with_capacity(to_process.len() * 2);
        for filename in &to_process {
            actions.push(Action::Fetch(filename.clone()));
        }
        if !self.hook {
            for filename in to_process.iter().rev() {
                if let Some(installed) = self.installed_filename_for(filename.name()) {
                    actions.push(Action::Remove(installed));
                }
            }
        }
        for filename in &to_process {
            actions.push(Action::Install(filename.clone()));
        }
        Ok(actions)
    }

    /// Computes and executes the plan for installing `req`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolve`] if resolution fails, or propagates a fatal fetch/install error.
    pub fn install(&self, req: &Requirement, mode: Mode, force: bool, forceall: bool, progress: impl ProgressSink) -> Result<usize, Error> {
        let actions = self.install_actions(req, mode, force, forceall)?;
        let performed = egg_exec::execute(&actions, &self.store, &self.collection, &self.cache_dir, progress)?;
        self.record_history()?;
        Ok(performed)
    }

    /// Computes the plan for removing the egg matching `req`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequirementTooWeak`] if `req` has strictness 0, [`Error::Collection`] (via
    /// [`egg_collection::Error::NotInstalled`]) if nothing matches, and [`Error::Ambiguous`] if more
    /// than one installed egg matches (only possible in hook mode).
    pub fn remove_actions(&self, req: &Requirement) -> Result<Vec<Action>, Error> {
        if req.strictness() < 1 {
            return Err(Error::RequirementTooWeak(req.to_string()));
        }
        let matches: Vec<InstalledEntry> = self
            .collection
            .primary()
            .query(req.name())
            .into_iter()
            .filter(|entry| req.matches(entry.record()))
            .collect();

        match matches.len() {
            0 => Err(egg_collection::Error::NotInstalled(req.to_string()).into()),
            1 => Ok(vec![Action::Remove(matches[0].record().filename())]),
            _ => Err(Error::Ambiguous {
                name: req.to_string(),
                versions: matches.iter().map(|entry| format!("{}-{}", entry.record().version(), entry.record().build())).collect(),
            }),
        }
    }

    /// Computes and executes the plan for removing the egg matching `req`.
    ///
    /// # Errors
    ///
    /// See [`Facade::remove_actions`].
    pub fn remove(&self, req: &Requirement, progress: impl ProgressSink) -> Result<usize, Error> {
        let actions = self.remove_actions(req)?;
        let performed = egg_exec::execute(&actions, &self.store, &self.collection, &self.cache_dir, progress)?;
        self.record_history()?;
        Ok(performed)
    }

    fn installed_filenames(&self) -> BTreeSet<EggFilename> {
        self.collection.primary().query(None).into_iter().map(|entry| entry.record().filename()).collect()
    }

    fn record_history(&self) -> Result<(), Error> {
        self.history.update(&self.installed_filenames())?;
        Ok(())
    }

    /// Looks a revision up by index or timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::History`] if no such revision exists.
    pub fn get_state(&self, rev: Revision) -> Result<egg_history::HistoryEntry, Error> {
        Ok(self.history.get_state(rev)?)
    }

    /// Reverts the primary prefix to the installed-egg set recorded at `rev`: removes eggs not in
    /// the target state, then installs eggs that are (`spec.md` §4.I).
    ///
    /// # Errors
    ///
    /// Returns [`Error::History`] if `rev` does not exist, and propagates fetch/install/remove
    /// errors.
    pub fn revert(&self, rev: Revision, progress: impl ProgressSink) -> Result<usize, Error> {
        let target = self.history.get_state(rev)?;
        let current = self.installed_filenames();
        let (to_remove, to_install) = egg_history::diff(target.state(), &current);

        info!("Reverting to revision {}: {} to remove, {} to install", target.rev(), to_remove.len(), to_install.len());

        let mut actions = Vec::with_capacity(to_remove.len() + to_install.len() * 2);
        actions.extend(to_remove.iter().cloned().map(Action::Remove));
        actions.extend(to_install.iter().cloned().map(Action::Fetch));
        actions.extend(to_install.iter().cloned().map(Action::Install));

        let performed = egg_exec::execute(&actions, &self.store, &self.collection, &self.cache_dir, progress)?;
        self.record_history()?;
        Ok(performed)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use egg_index::{IndexedStore, LocalIndexedStore};
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    fn write_index(dir: &Path, contents: &str) {
        let mut file = fs::File::create(dir.join("index-depend.txt")).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn make_egg(path: &Path) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer.start_file("foo/__init__.py", zip::write::FileOptions::default()).unwrap();
        writer.write_all(b"# foo").unwrap();
        writer.finish().unwrap();
    }

    fn md5_of(bytes: &[u8]) -> String {
        use md5::{Digest, Md5};
        let mut hasher = Md5::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    fn repo_with(dir: &Path, name: &str, version: &str, build: u32) {
        let archive_path = dir.join(format!("{name}-{version}-{build}.egg"));
        make_egg(&archive_path);
        let md5 = md5_of(&fs::read(&archive_path).unwrap());
        let size = fs::metadata(&archive_path).unwrap().len();
        let mut index = fs::read_to_string(dir.join("index-depend.txt")).unwrap_or_default();
        index.push_str(&format!(
            "==> {name}-{version}-{build}.egg <==\nname = '{name}'\nversion = '{version}'\nbuild = {build}\nmd5 = '{md5}'\nsize = {size}\n\n"
        ));
        write_index(dir, &index);
    }

    fn facade_over(repo_dir: &Path, prefix: &Path) -> Facade {
        let mut store = JoinedStore::new(vec![IndexedStore::LocalIndexed(LocalIndexedStore::new(repo_dir))]);
        store.connect();
        Facade::new(store, prefix, &[], false)
    }

    #[test]
    fn simple_install_fetches_and_installs() -> TestResult {
        let repo = tempdir()?;
        let prefix = tempdir()?;
        repo_with(repo.path(), "foo", "1.0.0", 1);
        let facade = facade_over(repo.path(), prefix.path());

        let req = Requirement::new("foo")?;
        let performed = facade.install(&req, Mode::Recur, false, false, |_, _, _, _: &Action| {})?;
        assert_eq!(performed, 2);
        assert!(facade.query_installed(Some(&EggName::new("foo")?)).len() == 1);
        Ok(())
    }

    #[test]
    fn upgrade_in_plain_mode_removes_the_old_version() -> TestResult {
        let repo = tempdir()?;
        let prefix = tempdir()?;
        repo_with(repo.path(), "foo", "1.0.0", 1);
        let facade = facade_over(repo.path(), prefix.path());
        facade.install(&Requirement::new("foo")?, Mode::Recur, false, false, |_, _, _, _: &Action| {})?;

        repo_with(repo.path(), "foo", "1.1.0", 1);
        let mut store = JoinedStore::new(vec![IndexedStore::LocalIndexed(LocalIndexedStore::new(repo.path()))]);
        store.connect();
        let facade = Facade::new(store, prefix.path(), &[], false);

        let actions = facade.install_actions(&Requirement::new("foo")?, Mode::Recur, false, false)?;
        assert_eq!(actions.len(), 3);
        assert!(matches!(actions[1], Action::Remove(_)));
        Ok(())
    }

    #[test]
    fn remove_requires_at_least_a_name() -> TestResult {
        let repo = tempdir()?;
        let prefix = tempdir()?;
        let facade = facade_over(repo.path(), prefix.path());
        assert!(matches!(facade.remove_actions(&Requirement::wildcard()), Err(Error::RequirementTooWeak(_))));
        Ok(())
    }

    #[test]
    fn ambiguous_remove_in_hook_mode_requires_a_version() -> TestResult {
        let repo = tempdir()?;
        let prefix = tempdir()?;
        repo_with(repo.path(), "foo", "1.0.0", 1);
        let mut store = JoinedStore::new(vec![IndexedStore::LocalIndexed(LocalIndexedStore::new(repo.path()))]);
        store.connect();
        let facade = Facade::new(store, prefix.path(), &[], true);
        facade.install(&Requirement::new("foo")?, Mode::Recur, false, false, |_, _, _, _: &Action| {})?;

        repo_with(repo.path(), "foo", "1.1.0", 1);
        let mut store = JoinedStore::new(vec![IndexedStore::LocalIndexed(LocalIndexedStore::new(repo.path()))]);
        store.connect();
        let facade = Facade::new(store, prefix.path(), &[], true);
        facade.install(&Requirement::new("foo")?, Mode::Recur, false, false, |_, _, _, _: &Action| {})?;
        assert_eq!(facade.query_installed(Some(&EggName::new("foo")?)).len(), 2);

        assert!(matches!(facade.remove_actions(&Requirement::new("foo")?), Err(Error::Ambiguous { .. })));
        assert!(facade.remove_actions(&Requirement::new("foo 1.0.0-1")?).is_ok());
        Ok(())
    }

    #[test]
    fn revert_restores_a_prior_revision() -> TestResult {
        let repo = tempdir()?;
        let prefix = tempdir()?;
        repo_with(repo.path(), "a", "1.0.0", 1);
        let facade = facade_over(repo.path(), prefix.path());

        facade.install(&Requirement::new("a")?, Mode::Recur, false, false, |_, _, _, _: &Action| {})?;
        let s0 = facade.get_state(Revision::Index(1))?;

        repo_with(repo.path(), "b", "1.0.0", 1);
        let mut store = JoinedStore::new(vec![IndexedStore::LocalIndexed(LocalIndexedStore::new(repo.path()))]);
        store.connect();
        let facade = Facade::new(store, prefix.path(), &[], false);
        facade.install(&Requirement::new("b")?, Mode::Recur, false, false, |_, _, _, _: &Action| {})?;

        facade.revert(Revision::Index(s0.rev()), |_, _, _, _: &Action| {})?;
        assert!(facade.query_installed(Some(&EggName::new("b")?)).is_empty());
        assert!(!facade.query_installed(Some(&EggName::new("a")?)).is_empty());
        Ok(())
    }
}
