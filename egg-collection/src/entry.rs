//! The installed-egg entry: a metadata record plus install-time extras.

use std::path::PathBuf;

use egg_types::PackageMetadata;
use serde::{Deserialize, Serialize};

use crate::Error;

/// On-disk shape of a sidecar file. [`PackageMetadata`] itself has no serde impl (it is validated
/// at construction, not deserialized), so the sidecar is a plain struct that gets rebuilt into a
/// [`PackageMetadata`] through its builder on load.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct Sidecar {
    name: String,
    version: String,
    build: u32,
    arch: Option<String>,
    platform: Option<String>,
    osdist: Option<String>,
    python: Option<String>,
    packages: Vec<String>,
    md5: String,
    size: u64,
    repo_dispname: Option<String>,
    ctime: String,
    hook: bool,
    files: Vec<PathBuf>,
}

/// An installed egg: its metadata record, plus `ctime`, `hook` and the sidecar location.
#[derive(Clone, Debug)]
pub struct InstalledEntry {
    record: PackageMetadata,
    ctime: String,
    hook: bool,
    meta_dir: PathBuf,
    files: Vec<PathBuf>,
}

impl InstalledEntry {
    pub(crate) fn new(record: PackageMetadata, ctime: String, hook: bool, meta_dir: PathBuf, files: Vec<PathBuf>) -> Self {
        InstalledEntry { record, ctime, hook, meta_dir, files }
    }

    /// Returns the absolute paths of every file this egg unpacked onto disk.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Returns the underlying metadata record.
    pub fn record(&self) -> &PackageMetadata {
        &self.record
    }

    /// Returns the ISO-8601 install timestamp.
    pub fn ctime(&self) -> &str {
        &self.ctime
    }

    /// Returns whether this egg was installed in hook (versioned) mode.
    pub fn hook(&self) -> bool {
        self.hook
    }

    /// Returns the sidecar metadata directory for this entry.
    pub fn meta_dir(&self) -> &std::path::Path {
        &self.meta_dir
    }

    pub(crate) fn write_sidecar(&self) -> Result<(), Error> {
        let sidecar = Sidecar {
            name: self.record.name().to_string(),
            version: self.record.version().to_string(),
            build: self.record.build(),
            arch: self.record.arch().map(str::to_string),
            platform: self.record.platform().map(str::to_string),
            osdist: self.record.osdist().map(str::to_string),
            python: self.record.python().map(str::to_string),
            packages: self.record.packages().to_vec(),
            md5: self.record.md5().to_string(),
            size: self.record.size(),
            repo_dispname: self.record.repo_dispname().map(str::to_string),
            ctime: self.ctime.clone(),
            hook: self.hook,
            files: self.files.clone(),
        };
        let path = self.meta_dir.join("info.json");
        let text = serde_json::to_string_pretty(&sidecar).map_err(|source| Error::Sidecar { path: path.clone(), source })?;
        std::fs::write(&path, text).map_err(|source| Error::IoPath { path, source })
    }

    pub(crate) fn read_sidecar(meta_dir: &std::path::Path) -> Result<Self, Error> {
        let path = meta_dir.join("info.json");
        let text = std::fs::read_to_string(&path).map_err(|source| Error::IoPath { path: path.clone(), source })?;
        let sidecar: Sidecar = serde_json::from_str(&text).map_err(|source| Error::Sidecar { path: path.clone(), source })?;

        let mut builder = PackageMetadata::builder(&sidecar.name, &sidecar.version, sidecar.build)
            .md5(sidecar.md5)
            .size(sidecar.size)
            .packages(sidecar.packages);
        if let Some(arch) = sidecar.arch {
            builder = builder.arch(arch);
        }
        if let Some(platform) = sidecar.platform {
            builder = builder.platform(platform);
        }
        if let Some(osdist) = sidecar.osdist {
            builder = builder.osdist(osdist);
        }
        if let Some(python) = sidecar.python {
            builder = builder.python(python);
        }
        if let Some(repo_dispname) = sidecar.repo_dispname {
            builder = builder.repo_dispname(repo_dispname);
        }
        let record = builder.build()?;

        Ok(InstalledEntry {
            record,
            ctime: sidecar.ctime,
            hook: sidecar.hook,
            meta_dir: meta_dir.to_path_buf(),
            files: sidecar.files,
        })
    }
}
