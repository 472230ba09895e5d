//! The package metadata record: one per egg described by an index.

use crate::{EggFilename, EggName, EggVersion, Error};

/// Metadata describing a single egg, as published by an index section or read from an egg
/// archive's embedded `EGG-INFO/spec/depend`.
///
/// `(name, version, build)` is the primary key within a single index: [`PackageMetadata::filename`]
/// reconstructs the canonical egg filename from it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageMetadata {
    name: EggName,
    version: EggVersion,
    build: u32,
    arch: Option<String>,
    platform: Option<String>,
    osdist: Option<String>,
    python: Option<String>,
    packages: Vec<String>,
    md5: String,
    size: u64,
    repo_dispname: Option<String>,
}

impl PackageMetadata {
    /// Starts building a [`PackageMetadata`] for the given name, version and build.
    pub fn builder(name: &str, version: &str, build: u32) -> PackageMetadataBuilder {
        PackageMetadataBuilder {
            name: name.to_string(),
            version: version.to_string(),
            build,
            arch: None,
            platform: None,
            osdist: None,
            python: None,
            packages: Vec::new(),
            md5: None,
            size: None,
            repo_dispname: None,
        }
    }

    /// Returns the canonical, lowercased name.
    pub fn name(&self) -> &EggName {
        &self.name
    }

    /// Returns the version.
    pub fn version(&self) -> &EggVersion {
        &self.version
    }

    /// Returns the build number.
    pub fn build(&self) -> u32 {
        self.build
    }

    /// Returns the target CPU architecture, if recorded.
    pub fn arch(&self) -> Option<&str> {
        self.arch.as_deref()
    }

    /// Returns the target platform, if recorded.
    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// Returns the target OS distribution, if recorded.
    pub fn osdist(&self) -> Option<&str> {
        self.osdist.as_deref()
    }

    /// Returns the required Python version, if recorded.
    pub fn python(&self) -> Option<&str> {
        self.python.as_deref()
    }

    /// Returns the dependency requirement strings.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Returns the lowercase hex md5 digest of the egg archive.
    pub fn md5(&self) -> &str {
        &self.md5
    }

    /// Returns the size of the egg archive in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the display provenance of the repository this record came from, if recorded.
    pub fn repo_dispname(&self) -> Option<&str> {
        self.repo_dispname.as_deref()
    }

    /// Reconstructs the canonical egg filename `<name>-<version>-<build>.egg`.
    pub fn filename(&self) -> EggFilename {
        EggFilename::new(self.name.clone(), self.version.clone(), self.build)
    }
}

/// Builder for [`PackageMetadata`].
///
/// Validation of the name, version and md5 digest is deferred to [`PackageMetadataBuilder::build`].
#[derive(Clone, Debug)]
pub struct PackageMetadataBuilder {
    name: String,
    version: String,
    build: u32,
    arch: Option<String>,
    platform: Option<String>,
    osdist: Option<String>,
    python: Option<String>,
    packages: Vec<String>,
    md5: Option<String>,
    size: Option<u64>,
    repo_dispname: Option<String>,
}

impl PackageMetadataBuilder {
    /// Sets the target architecture.
    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Sets the target platform.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Sets the target OS distribution.
    pub fn osdist(mut self, osdist: impl Into<String>) -> Self {
        self.osdist = Some(osdist.into());
        self
    }

    /// Sets the required Python version.
    pub fn python(mut self, python: impl Into<String>) -> Self {
        self.python = Some(python.into());
        self
    }

    /// Appends a dependency requirement string.
    pub fn package(mut self, requirement: impl Into<String>) -> Self {
        self.packages.push(requirement.into());
        self
    }

    /// Appends several dependency requirement strings.
    pub fn packages(mut self, requirements: impl IntoIterator<Item = String>) -> Self {
        self.packages.extend(requirements);
        self
    }

    /// Sets the md5 digest. Must be 32 hex characters, checked at [`PackageMetadataBuilder::build`].
    pub fn md5(mut self, md5: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self
    }

    /// Sets the archive size in bytes.
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the display provenance.
    pub fn repo_dispname(mut self, repo_dispname: impl Into<String>) -> Self {
        self.repo_dispname = Some(repo_dispname.into());
        self
    }

    /// Validates and constructs the [`PackageMetadata`].
    ///
    /// # Errors
    ///
    /// Returns an error if the name or version are malformed, or if an explicitly set md5 digest
    /// is not 32 hex characters. A digest that was never set defaults to 32 zeroes, which is only
    /// appropriate for records that do not need integrity verification (e.g. in tests).
    pub fn build(self) -> Result<PackageMetadata, Error> {
        let name = EggName::new(&self.name)?;
        let version = EggVersion::new(&self.version)?;
        let md5 = self.md5.unwrap_or_else(|| "0".repeat(32));
        if md5.len() != 32 || !md5.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidMd5(md5));
        }

        Ok(PackageMetadata {
            name,
            version,
            build: self.build,
            arch: self.arch,
            platform: self.platform,
            osdist: self.osdist,
            python: self.python,
            packages: self.packages,
            md5,
            size: self.size.unwrap_or(0),
            repo_dispname: self.repo_dispname,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_round_trips_from_record_fields() {
        let record = PackageMetadata::builder("NumPy", "1.26.0", 3)
            .md5("d41d8cd98f00b204e9800998ecf8427e")
            .size(1024)
            .package("scipy 1.11.0")
            .build()
            .unwrap();
        assert_eq!(record.filename().to_string(), "numpy-1.26.0-3.egg");
        assert_eq!(record.packages(), &["scipy 1.11.0".to_string()]);
    }

    #[test]
    fn build_rejects_malformed_md5() {
        let err = PackageMetadata::builder("numpy", "1.26.0", 3)
            .md5("not-a-digest")
            .build();
        assert!(err.is_err());
    }
}
