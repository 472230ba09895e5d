//! Command-line argument handling for `eggs`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// The command-line interface for the `eggs` package manager.
#[derive(Clone, Debug, Parser)]
#[command(about, author, name = "eggs", version)]
pub struct Cli {
    /// Log verbosity level
    #[command(flatten)]
    pub verbose: clap_verbosity::Verbosity,

    /// Repository URL to draw packages from; may be repeated, in precedence order.
    ///
    /// Accepts `file://<path>`, `http(s)://<host>/<path>/`, a bare directory path, or the
    /// sentinel `local:` for the primary prefix's own download cache.
    #[arg(long = "repo", global = true, action = ArgAction::Append, value_name = "URL")]
    pub repos: Vec<String>,

    /// The primary installation prefix.
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    pub prefix: PathBuf,

    /// Additional prefixes consulted for reads only.
    #[arg(long = "extra-prefix", global = true, action = ArgAction::Append, value_name = "DIR")]
    pub extra_prefixes: Vec<PathBuf>,

    /// Use hook (versioned) layout, allowing multiple versions of the same egg side by side.
    #[arg(long, global = true)]
    pub hook: bool,

    /// The `eggs` commands.
    #[command(subcommand)]
    pub command: Command,
}

/// The `eggs` subcommands.
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Resolve and install a requirement.
    Install {
        /// The requirement to install, e.g. `"numpy 1.26.0"`.
        requirement: String,

        /// Resolve only the requested egg, ignoring its dependencies.
        #[arg(long)]
        root: bool,

        /// Always reinstall the requested egg, even if already installed.
        #[arg(long)]
        force: bool,

        /// Always reinstall every egg in the plan, including dependencies.
        #[arg(long)]
        forceall: bool,
    },

    /// Remove an installed egg.
    Remove {
        /// The requirement identifying the egg to remove, e.g. `"numpy"`.
        requirement: String,
    },

    /// Query remote and installed packages.
    Query {
        /// Restrict results to this package name.
        name: Option<String>,
    },

    /// List recorded history revisions.
    History,

    /// Revert the primary prefix to a prior revision.
    Revert {
        /// A revision number, or an RFC 3339 timestamp.
        revision: String,
    },
}
