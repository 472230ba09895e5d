//! Error handling for egg-resolve.

/// An error that can occur while computing an install sequence.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No candidate in the store satisfies a requirement.
    #[error("No candidate satisfies requirement {0:?}")]
    NoCandidate(String),

    /// Two dependency paths demand different versions of the same name.
    #[error("Conflict: {name:?} is required as both {first:?} and {second:?}")]
    Conflict { name: String, first: String, second: String },

    /// A requirement string embedded in a package's dependency list was malformed.
    #[error(transparent)]
    Types(#[from] egg_types::Error),

    /// The store backing this resolution could not be queried.
    #[error(transparent)]
    Index(#[from] egg_index::Error),
}
