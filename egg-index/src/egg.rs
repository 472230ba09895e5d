//! Reading an egg archive's embedded spec.

use std::{fs, io::Read, path::Path};

use egg_types::PackageMetadata;
use md5::{Digest, Md5};

use crate::{Error, convert::record_from_fields, parser::parse_body};

const SPEC_MEMBER: &str = "EGG-INFO/spec/depend";

/// Reads `EGG-INFO/spec/depend` out of the egg archive at `path` and builds a [`PackageMetadata`]
/// from it, filling in `md5` and `size` from the archive file itself since the spec member never
/// carries those two fields (`spec.md` §6).
///
/// # Errors
///
/// Returns [`Error::Archive`] if the zip cannot be opened or does not contain the spec member,
/// and propagates parse/validation errors from the spec body.
pub fn record_from_archive(path: &Path) -> Result<PackageMetadata, Error> {
    let bytes = fs::read(path).map_err(|source| Error::Io { path: path.display().to_string(), source })?;

    let mut hasher = Md5::new();
    hasher.update(&bytes);
    let md5 = format!("{:x}", hasher.finalize());
    let size = bytes.len() as i64;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(&bytes)).map_err(|err| Error::Archive {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;
    let mut spec = archive.by_name(SPEC_MEMBER).map_err(|err| Error::Archive {
        path: path.display().to_string(),
        detail: format!("missing {SPEC_MEMBER}: {err}"),
    })?;
    let mut text = String::new();
    spec.read_to_string(&mut text).map_err(|err| Error::Archive {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;
    drop(spec);

    let mut fields = parse_body(&text)?;
    fields.insert("md5".to_string(), crate::parser::Literal::Str(md5));
    fields.insert("size".to_string(), crate::parser::Literal::Int(size));

    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    record_from_fields(filename, &fields)
}
