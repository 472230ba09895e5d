//! The append-only history log itself, and revision lookup.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use egg_types::EggFilename;
use log::{debug, info};
use time::OffsetDateTime;

use crate::{Error, entry::HistoryEntry};

/// A way to identify a revision in [`HistoryLog::get_state`].
#[derive(Clone, Copy, Debug)]
pub enum Revision {
    /// An exact revision number.
    Index(u64),
    /// The latest revision whose timestamp is at or before the given time.
    Timestamp(OffsetDateTime),
}

/// The append-only per-prefix history log.
///
/// Revision 0 is the implicit empty state before anything has ever been installed; it is never
/// written to disk.
#[derive(Clone, Debug)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    /// Opens the history log at `prefix`'s standard location (`<prefix>/EGG-META/history`).
    pub fn new(prefix: impl AsRef<Path>) -> Self {
        HistoryLog { path: prefix.as_ref().join("EGG-META").join("history") }
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>, Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|source| Error::IoPath { path: self.path.clone(), source })?;
        text.split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(HistoryEntry::parse)
            .collect()
    }

    /// Returns every recorded revision, oldest first.
    pub fn all(&self) -> Result<Vec<HistoryEntry>, Error> {
        self.entries()
    }

    /// Returns the most recently recorded state, or the empty set if nothing has been recorded.
    pub fn current_state(&self) -> Result<BTreeSet<EggFilename>, Error> {
        Ok(self.entries()?.last().map(|entry| entry.state().clone()).unwrap_or_default())
    }

    /// Looks a revision up by index or by timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchRevision`] if no entry matches.
    pub fn get_state(&self, rev: Revision) -> Result<HistoryEntry, Error> {
        let entries = self.entries()?;
        match rev {
            Revision::Index(index) => entries
                .into_iter()
                .find(|entry| entry.rev() == index)
                .ok_or_else(|| Error::NoSuchRevision(index.to_string())),
            Revision::Timestamp(at) => entries
                .into_iter()
                .filter(|entry| entry.timestamp() <= at)
                .next_back()
                .ok_or_else(|| Error::NoSuchRevision(at.to_string())),
        }
    }

    /// Records `current` as a new revision if it differs from the most recently recorded state.
    /// No-op (returns `Ok(None)`) if the state has not changed.
    ///
    /// # Errors
    ///
    /// Propagates I/O and parse errors reading the existing log.
    pub fn update(&self, current: &BTreeSet<EggFilename>) -> Result<Option<HistoryEntry>, Error> {
        let mut entries = self.entries()?;
        let last_state = entries.last().map(HistoryEntry::state);
        if last_state == Some(current) {
            debug!("Installed-egg set unchanged, no history entry recorded");
            return Ok(None);
        }

        let next_rev = entries.last().map(|entry| entry.rev() + 1).unwrap_or(1);
        let entry = HistoryEntry::new(next_rev, OffsetDateTime::now_utc(), current.clone());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::IoPath { path: parent.to_path_buf(), source })?;
        }
        let rendered = entry.render()?;
        let mut existing = fs::read_to_string(&self.path).unwrap_or_default();
        existing.push_str(&rendered);
        fs::write(&self.path, existing).map_err(|source| Error::IoPath { path: self.path.clone(), source })?;

        info!("Recorded history revision {next_rev}");
        entries.push(entry.clone());
        Ok(Some(entry))
    }
}

/// Diffs a target state against the current one: `to_remove = current − target`,
/// `to_install = target − current` (`spec.md` §4.I).
pub fn diff(target: &BTreeSet<EggFilename>, current: &BTreeSet<EggFilename>) -> (BTreeSet<EggFilename>, BTreeSet<EggFilename>) {
    let to_remove = current.difference(target).cloned().collect();
    let to_install = target.difference(current).cloned().collect();
    (to_remove, to_install)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    fn filenames(names: &[&str]) -> BTreeSet<EggFilename> {
        names.iter().map(|name| EggFilename::from_str(name).unwrap()).collect()
    }

    #[test]
    fn update_is_a_no_op_when_state_is_unchanged() -> TestResult {
        let prefix = tempdir()?;
        let log = HistoryLog::new(prefix.path());
        let state = filenames(&["foo-1.0.0-1.egg"]);

        let first = log.update(&state)?;
        assert!(first.is_some());
        let second = log.update(&state)?;
        assert!(second.is_none());
        Ok(())
    }

    #[test]
    fn revisions_increase_monotonically_and_are_queryable_by_index() -> TestResult {
        let prefix = tempdir()?;
        let log = HistoryLog::new(prefix.path());

        log.update(&filenames(&["foo-1.0.0-1.egg"]))?;
        log.update(&filenames(&["foo-1.0.0-1.egg", "bar-2.0.0-1.egg"]))?;

        let rev1 = log.get_state(Revision::Index(1))?;
        let rev2 = log.get_state(Revision::Index(2))?;
        assert_eq!(rev1.state(), &filenames(&["foo-1.0.0-1.egg"]));
        assert_eq!(rev2.state(), &filenames(&["foo-1.0.0-1.egg", "bar-2.0.0-1.egg"]));
        assert!(log.get_state(Revision::Index(3)).is_err());
        Ok(())
    }

    #[test]
    fn revert_diff_computes_remove_and_install_sets() {
        let target = filenames(&["foo-1.0.0-1.egg"]);
        let current = filenames(&["foo-1.0.0-1.egg", "bar-2.0.0-1.egg"]);
        let (to_remove, to_install) = diff(&target, &current);
        assert_eq!(to_remove, filenames(&["bar-2.0.0-1.egg"]));
        assert!(to_install.is_empty());
    }
}
