//! Error handling for egg-types.

/// An error that can occur when parsing or validating egg names, versions and requirements.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A string does not form a valid egg filename (`<name>-<version>-<build>.egg`).
    #[error("Invalid egg filename: {0:?}")]
    InvalidEggFilename(String),

    /// A string does not form a valid egg name.
    #[error("Invalid egg name: {0:?}")]
    InvalidName(String),

    /// The build number of an egg filename is not a non-negative integer.
    #[error("Invalid build number: {0:?}")]
    InvalidBuild(String),

    /// A requirement string could not be parsed.
    #[error("Invalid requirement: {0:?}")]
    InvalidRequirement(String),

    /// An md5 digest is not 32 hex characters.
    #[error("Invalid md5 digest: {0:?}")]
    InvalidMd5(String),
}
