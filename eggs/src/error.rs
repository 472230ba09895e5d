//! Error handling for the `eggs` facade.

/// An error that can occur anywhere in the facade: resolution, fetching, installing, removing, or
/// history lookup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A name, version, requirement or filename failed validation.
    #[error(transparent)]
    Types(#[from] egg_types::Error),

    /// The repository chain could not be queried.
    #[error(transparent)]
    Index(#[from] egg_index::Error),

    /// Dependency resolution failed.
    #[error(transparent)]
    Resolve(#[from] egg_resolve::Error),

    /// A collection operation failed.
    #[error(transparent)]
    Collection(#[from] egg_collection::Error),

    /// Fetching an archive failed.
    #[error(transparent)]
    Fetch(#[from] egg_fetch::Error),

    /// Executing a plan failed.
    #[error(transparent)]
    Exec(#[from] egg_exec::Error),

    /// A history lookup failed.
    #[error(transparent)]
    History(#[from] egg_history::Error),

    /// A requirement passed to `remove` named no package (strictness 0).
    #[error("Requirement {0:?} is too weak to remove anything")]
    RequirementTooWeak(String),

    /// More than one installed egg matches a remove requirement (only possible in hook mode).
    #[error("{name} is installed more than once: {versions:?}")]
    Ambiguous { name: String, versions: Vec<String> },
}
