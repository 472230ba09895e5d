//! Converting parsed index fields into [`egg_types::PackageMetadata`].

use std::collections::BTreeMap;

use egg_types::PackageMetadata;

use crate::{
    Error,
    parser::{IndexSection, Literal},
};

fn require_str<'a>(
    fields: &'a BTreeMap<String, Literal>,
    filename: &str,
    key: &'static str,
) -> Result<&'a str, Error> {
    fields
        .get(key)
        .and_then(Literal::as_str)
        .ok_or_else(|| Error::MissingKey(filename.to_string(), key))
}

fn require_int(fields: &BTreeMap<String, Literal>, filename: &str, key: &'static str) -> Result<i64, Error> {
    fields
        .get(key)
        .and_then(Literal::as_int)
        .ok_or_else(|| Error::MissingKey(filename.to_string(), key))
}

fn optional_str(fields: &BTreeMap<String, Literal>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Literal::Str(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Builds a [`PackageMetadata`] record from a section's parsed fields.
///
/// # Errors
///
/// Returns [`Error::MissingKey`] if `name`, `version`, `build`, `md5` or `size` are absent, and
/// propagates [`egg_types::Error`] if `name` or `version` fail validation.
pub fn record_from_fields(filename: &str, fields: &BTreeMap<String, Literal>) -> Result<PackageMetadata, Error> {
    let name = require_str(fields, filename, "name")?;
    let version = require_str(fields, filename, "version")?;
    let build = require_int(fields, filename, "build")?;
    let md5 = require_str(fields, filename, "md5")?;
    let size = require_int(fields, filename, "size")?;

    let mut builder = PackageMetadata::builder(name, version, u32::try_from(build).unwrap_or(0))
        .md5(md5)
        .size(u64::try_from(size).unwrap_or(0));

    if let Some(arch) = optional_str(fields, "arch") {
        builder = builder.arch(arch);
    }
    if let Some(platform) = optional_str(fields, "platform") {
        builder = builder.platform(platform);
    }
    if let Some(osdist) = optional_str(fields, "osdist") {
        builder = builder.osdist(osdist);
    }
    if let Some(python) = optional_str(fields, "python") {
        builder = builder.python(python);
    }
    if let Some(Literal::List(items)) = fields.get("packages") {
        builder = builder.packages(items.iter().cloned());
    }
    if let Some(repo_dispname) = optional_str(fields, "repo_dispname") {
        builder = builder.repo_dispname(repo_dispname);
    }

    Ok(builder.build()?)
}

/// Builds every record described by a parsed index document.
///
/// # Errors
///
/// Propagates the first conversion failure from [`record_from_fields`].
pub fn records_from_sections(
    sections: &[IndexSection],
) -> Result<BTreeMap<String, PackageMetadata>, Error> {
    let mut records = BTreeMap::new();
    for section in sections {
        let record = record_from_fields(&section.filename, &section.fields)?;
        records.insert(section.filename.clone(), record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_index;

    #[test]
    fn builds_record_with_optional_fields() {
        let text = "==> numpy-1.26.0-3.egg <==\n\
                     name = 'numpy'\n\
                     version = '1.26.0'\n\
                     build = 3\n\
                     arch = 'x86_64'\n\
                     packages = [\n\
                       'six 1.0.0',\n\
                     ]\n\
                     md5 = 'd41d8cd98f00b204e9800998ecf8427e'\n\
                     size = 1024\n";
        let sections = parse_index(text).unwrap();
        let records = records_from_sections(&sections).unwrap();
        let record = records.get("numpy-1.26.0-3.egg").unwrap();
        assert_eq!(record.name().as_str(), "numpy");
        assert_eq!(record.arch(), Some("x86_64"));
        assert_eq!(record.size(), 1024);
        assert_eq!(record.packages(), &["six 1.0.0".to_string()]);
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let text = "==> numpy-1.26.0-3.egg <==\n\
                     name = 'numpy'\n\
                     version = '1.26.0'\n\
                     build = 3\n";
        let sections = parse_index(text).unwrap();
        assert!(records_from_sections(&sections).is_err());
    }
}
