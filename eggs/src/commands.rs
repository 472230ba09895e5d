//! Command line functions called by the `eggs` executable.

use std::io::Write;

use egg_exec::Action;
use egg_history::Revision;
use egg_index::{JoinedStore, ProxyConfig, stores_from_urls};
use egg_resolve::Mode;
use egg_types::Requirement;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, Facade, cli::Cli};

fn mode_for(root: bool) -> Mode {
    if root { Mode::Root } else { Mode::Recur }
}

/// Builds a connected [`Facade`] from the parsed command line arguments.
///
/// # Errors
///
/// Propagates repository-chain construction or connection failures.
pub fn build_facade(cli: &Cli) -> Result<Facade, Error> {
    let cache_dir = cli.prefix.join("LOCAL-REPO");
    let repos = if cli.repos.is_empty() { vec!["local:".to_string()] } else { cli.repos.clone() };
    let proxy = ProxyConfig::from_env();
    let stores = stores_from_urls(&repos, &cache_dir, None, Some(&proxy))?;
    let mut facade = Facade::new(JoinedStore::new(stores), &cli.prefix, &cli.extra_prefixes, cli.hook);
    facade.connect();
    Ok(facade)
}

fn report_progress<W: Write>(output: &mut W, _super_id: uuid::Uuid, index: usize, total: usize, action: &Action) {
    let (verb, filename) = match action {
        Action::Fetch(filename) => ("fetching", filename),
        Action::Install(filename) => ("installing", filename),
        Action::Remove(filename) => ("removing", filename),
    };
    let _ = writeln!(output, "[{}/{total}] {verb} {filename}", index + 1);
}

/// Runs the `install` subcommand.
///
/// # Errors
///
/// Propagates resolution, fetch or install failures.
pub fn install<W: Write>(cli: &Cli, requirement: &str, root: bool, force: bool, forceall: bool, output: &mut W) -> Result<(), Error> {
    let facade = build_facade(cli)?;
    let req = Requirement::new(requirement)?;
    let performed = facade.install(&req, mode_for(root), force, forceall, |id, index, total, action: &Action| {
        report_progress(output, id, index, total, action);
    })?;
    let _ = writeln!(output, "{performed} action(s) performed");
    Ok(())
}

/// Runs the `remove` subcommand.
///
/// # Errors
///
/// Returns [`Error::RequirementTooWeak`], [`Error::Ambiguous`], or propagates a removal failure.
pub fn remove<W: Write>(cli: &Cli, requirement: &str, output: &mut W) -> Result<(), Error> {
    let facade = build_facade(cli)?;
    let req = Requirement::new(requirement)?;
    let performed = facade.remove(&req, |id, index, total, action: &Action| {
        report_progress(output, id, index, total, action);
    })?;
    let _ = writeln!(output, "{performed} action(s) performed");
    Ok(())
}

/// Runs the `query` subcommand.
///
/// # Errors
///
/// Propagates store or collection query failures (there are none today, but the signature stays
/// fallible for symmetry with the other commands and to absorb future failure modes).
pub fn query<W: Write>(cli: &Cli, name: Option<&str>, output: &mut W) -> Result<(), Error> {
    let facade = build_facade(cli)?;
    for (key, record) in facade.query(name) {
        let installed = facade.query_installed(Some(record.name())).iter().any(|entry| entry.record().filename().to_string() == key);
        let marker = if installed { "i" } else { " " };
        let _ = writeln!(output, "{marker} {key}");
    }
    Ok(())
}

/// Runs the `history` subcommand.
///
/// # Errors
///
/// Propagates history log read failures.
pub fn history<W: Write>(cli: &Cli, output: &mut W) -> Result<(), Error> {
    let log = egg_history::HistoryLog::new(&cli.prefix);
    for entry in log.all()? {
        let _ = writeln!(output, "rev {} at {}: {} egg(s)", entry.rev(), entry.timestamp(), entry.state().len());
    }
    Ok(())
}

/// Runs the `revert` subcommand.
///
/// # Errors
///
/// Returns [`Error::History`] if `revision` names no recorded revision, and propagates any
/// remove/fetch/install failure while applying the diff.
pub fn revert<W: Write>(cli: &Cli, revision: &str, output: &mut W) -> Result<(), Error> {
    let facade = build_facade(cli)?;
    let rev = match revision.parse::<u64>() {
        Ok(index) => Revision::Index(index),
        Err(_) => Revision::Timestamp(
            OffsetDateTime::parse(revision, &Rfc3339).map_err(|_| egg_history::Error::NoSuchRevision(revision.to_string()))?,
        ),
    };
    let performed = facade.revert(rev, |id, index, total, action: &Action| {
        report_progress(output, id, index, total, action);
    })?;
    let _ = writeln!(output, "{performed} action(s) performed");
    Ok(())
}
