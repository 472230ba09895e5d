//! Error handling for egg-index.

/// An error that can occur while parsing an index, or while querying a store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An index section's body could not be parsed as the bounded literal grammar.
    #[error("Malformed index at {context}: {detail}")]
    Parse { context: String, detail: String },

    /// A required key was missing from an index section.
    #[error("Index section for {0:?} is missing required key {1:?}")]
    MissingKey(String, &'static str),

    /// A store could not be reached (network failure, missing directory, ...).
    ///
    /// Recoverable at the joined-store level: the offending store is demoted to empty for the
    /// remainder of the session.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// No store in a chain has the requested key.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// An underlying filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io { path: String, source: std::io::Error },

    /// A name, version or filename component failed validation.
    #[error(transparent)]
    Types(#[from] egg_types::Error),

    /// Reading an egg archive's embedded spec failed.
    #[error("Failed to read archive {path}: {detail}")]
    Archive { path: String, detail: String },

    /// A repository URL used an unsupported scheme.
    #[error("Unsupported repository URL: {0:?}")]
    UnsupportedUrl(String),
}
