//! The resolver: latest-wins candidate selection plus a topological install sequence.

use std::collections::BTreeMap;

use egg_index::JoinedStore;
use egg_types::{EggFilename, EggName, PackageMetadata, Requirement};
use log::debug;

use crate::Error;

/// Whether to resolve only the requested egg, or its full transitive dependency closure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Resolve only the requirement itself, ignoring its declared dependencies.
    Root,
    /// Resolve the requirement and recursively every dependency it declares.
    Recur,
}

struct Resolution {
    chosen: BTreeMap<EggName, PackageMetadata>,
    order: Vec<EggFilename>,
    in_progress: Vec<EggName>,
}

fn candidates(store: &JoinedStore, req: &Requirement) -> Vec<PackageMetadata> {
    let Some(name) = req.name() else { return Vec::new() };
    store
        .query(Some(name.as_str()))
        .into_iter()
        .map(|(_, record)| record)
        .filter(|record| req.matches(record))
        .collect()
}

/// Picks the newest candidate by `(comparable_version, build)`, descending.
fn pick_latest(mut candidates: Vec<PackageMetadata>) -> Option<PackageMetadata> {
    candidates.sort_by(|a, b| {
        a.version()
            .comparable()
            .cmp(&b.version().comparable())
            .then(a.build().cmp(&b.build()))
    });
    candidates.pop()
}

fn resolve_one(req: &Requirement, store: &JoinedStore, mode: Mode, state: &mut Resolution) -> Result<(), Error> {
    let Some(name) = req.name() else {
        return Err(Error::NoCandidate(req.to_string()));
    };

    let picked = pick_latest(candidates(store, req)).ok_or_else(|| Error::NoCandidate(req.to_string()))?;

    if let Some(already) = state.chosen.get(name) {
        if already.filename().to_string() == picked.filename().to_string() {
            debug!("{name} already resolved to {}", picked.filename());
            return Ok(());
        }
        return Err(Error::Conflict {
            name: name.to_string(),
            first: already.filename().to_string(),
            second: picked.filename().to_string(),
        });
    }

    if state.in_progress.contains(name) {
        // A cycle that resolves to the same egg we're already computing: the earlier instance
        // on the stack will provide it once it finishes.
        return Ok(());
    }

    state.chosen.insert(name.clone(), picked.clone());
    state.in_progress.push(name.clone());

    if mode == Mode::Recur {
        let mut dep_reqs = picked
            .packages()
            .iter()
            .map(|dep| Requirement::new(dep))
            .collect::<Result<Vec<_>, _>>()?;
        dep_reqs.sort_by(|a, b| {
            a.name()
                .map(EggName::as_str)
                .unwrap_or_default()
                .cmp(b.name().map(EggName::as_str).unwrap_or_default())
        });
        for dep_req in &dep_reqs {
            resolve_one(dep_req, store, mode, state)?;
        }
    }

    state.in_progress.pop();
    state.order.push(picked.filename());
    Ok(())
}

/// Computes the ordered install sequence for `req` against `store`.
///
/// The result is deterministic: given unchanged store contents, repeated calls return the same
/// sequence. Dependencies always precede their dependents; the egg matching `req` itself is
/// always last.
///
/// # Errors
///
/// Returns [`Error::NoCandidate`] if no record in the store matches `req` (or a dependency of it),
/// and [`Error::Conflict`] if two dependency paths pin incompatible versions of the same name.
pub fn install_sequence(req: &Requirement, store: &JoinedStore, mode: Mode) -> Result<Vec<EggFilename>, Error> {
    let mut state = Resolution { chosen: BTreeMap::new(), order: Vec::new(), in_progress: Vec::new() };
    resolve_one(req, store, mode, &mut state)?;
    Ok(state.order)
}
