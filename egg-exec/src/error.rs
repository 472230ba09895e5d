//! Error handling for egg-exec.

/// An error that can occur while executing an action plan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching an egg archive into the cache failed.
    #[error(transparent)]
    Fetch(#[from] egg_fetch::Error),

    /// Installing or removing from a collection failed.
    #[error(transparent)]
    Collection(#[from] egg_collection::Error),

    /// Querying the store failed.
    #[error(transparent)]
    Index(#[from] egg_index::Error),
}
