//! Executing an ordered plan of fetch/install/remove actions.

use std::path::{Path, PathBuf};

use egg_collection::JoinedEggCollection;
use egg_index::JoinedStore;
use egg_types::EggFilename;
use log::{info, warn};
use uuid::Uuid;

use crate::Error;

/// A single step in an execution plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// Download the archive into the local cache, without installing it.
    Fetch(EggFilename),
    /// Fetch if necessary, then unpack into the target collection.
    Install(EggFilename),
    /// Remove an already-installed egg.
    Remove(EggFilename),
}

impl Action {
    fn filename(&self) -> &EggFilename {
        match self {
            Action::Fetch(filename) | Action::Install(filename) | Action::Remove(filename) => filename,
        }
    }
}

/// Receives one event per action in a plan, all tagged with the same super-operation id so a
/// caller can correlate progress across a whole batch (`spec.md` §4.H).
pub trait ProgressSink {
    fn on_action(&mut self, super_id: Uuid, index: usize, total: usize, action: &Action);
}

impl<F: FnMut(Uuid, usize, usize, &Action)> ProgressSink for F {
    fn on_action(&mut self, super_id: Uuid, index: usize, total: usize, action: &Action) {
        self(super_id, index, total, action);
    }
}

/// Runs `plan` against `store`/`collection`/`cache_dir` in order, under a freshly generated
/// super-operation id.
///
/// A `Remove` of an egg that turns out not to be installed is tolerated and does not count towards
/// the returned total. Every other failure — a fetch or install error — is fatal: execution stops
/// immediately, already-completed actions are left committed, and no rollback is attempted
/// (`spec.md` §4.H).
///
/// # Errors
///
/// Returns the first fatal error encountered while fetching or installing.
pub fn execute(
    plan: &[Action],
    store: &JoinedStore,
    collection: &JoinedEggCollection,
    cache_dir: &Path,
    mut progress: impl ProgressSink,
) -> Result<usize, Error> {
    let super_id = Uuid::new_v4();
    let total = plan.len();
    let mut performed = 0;

    info!("Executing plan of {total} action(s) under {super_id}");

    for (index, action) in plan.iter().enumerate() {
        progress.on_action(super_id, index, total, action);

        match action {
            Action::Fetch(filename) => {
                fetch_into_cache(store, filename, cache_dir)?;
                performed += 1;
            }
            Action::Install(filename) => {
                let archive = fetch_into_cache(store, filename, cache_dir)?;
                let record = store.get_metadata(&filename.to_string())?;
                collection.install(record, &archive)?;
                performed += 1;
            }
            Action::Remove(filename) => match collection.remove(filename) {
                Ok(()) => performed += 1,
                Err(egg_collection::Error::NotInstalled(_)) => {
                    warn!("{filename} is not installed, nothing to remove");
                }
                Err(err) => return Err(err.into()),
            },
        }
    }

    info!("Completed {performed} of {total} action(s) under {super_id}");
    Ok(performed)
}

fn fetch_into_cache(store: &JoinedStore, filename: &EggFilename, cache_dir: &Path) -> Result<PathBuf, Error> {
    let key = filename.to_string();
    Ok(egg_fetch::fetch_egg(store, &key, cache_dir, false, |_, _| {})?)
}
