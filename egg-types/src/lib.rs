#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod error;
pub use error::Error;

mod filename;
pub use filename::EggFilename;

mod name;
pub use name::EggName;

mod record;
pub use record::{PackageMetadata, PackageMetadataBuilder};

mod requirement;
pub use requirement::Requirement;

mod version;
pub use version::{ComparableVersion, EggVersion};
