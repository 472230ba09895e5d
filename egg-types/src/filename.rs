//! Egg filename parsing: `<name>-<version>-<build>.egg`.

use std::{fmt::Display, path::Path, str::FromStr};

use log::debug;
use winnow::{
    ModalResult,
    Parser,
    ascii::dec_uint,
    combinator::{cut_err, eof, terminated},
    error::StrContext,
    token::take_until,
};

use crate::{EggName, EggVersion, Error};

/// The parsed filename of an egg archive.
///
/// Unlike Arch Linux package filenames, egg names and versions never contain a hyphen, so the
/// three dash-separated components of an egg filename are unambiguous: there is no need to count
/// dashes up front to know where the name ends and the version begins.
///
/// ## Examples
/// ```
/// use egg_types::EggFilename;
///
/// let filename: EggFilename = "numpy-1.26.0-3.egg".parse().unwrap();
/// assert_eq!(filename.name().as_str(), "numpy");
/// assert_eq!(filename.version().as_str(), "1.26.0");
/// assert_eq!(filename.build(), 3);
/// assert_eq!(filename.to_string(), "numpy-1.26.0-3.egg");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EggFilename {
    name: EggName,
    version: EggVersion,
    build: u32,
}

impl EggFilename {
    /// Creates a new [`EggFilename`] from its parts.
    pub fn new(name: EggName, version: EggVersion, build: u32) -> Self {
        EggFilename { name, version, build }
    }

    /// Returns the name component.
    pub fn name(&self) -> &EggName {
        &self.name
    }

    /// Returns the version component.
    pub fn version(&self) -> &EggVersion {
        &self.version
    }

    /// Returns the build number.
    pub fn build(&self) -> u32 {
        self.build
    }

    /// Recognizes an [`EggFilename`] in a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the name, version or build number components cannot be recognized, or
    /// if the filename does not end in `.egg`.
    pub fn parser(input: &mut &str) -> ModalResult<Self> {
        debug!("Recognizing EggFilename in {input}.");

        let name = cut_err(take_until(1.., "-").try_map(EggName::new))
            .context(StrContext::Label("egg name"))
            .parse_next(input)?;
        "-".parse_next(input)?;

        let version = cut_err(take_until(1.., "-").try_map(|s: &str| EggVersion::new(s)))
            .context(StrContext::Label("egg version"))
            .parse_next(input)?;
        "-".parse_next(input)?;

        let build = cut_err(terminated(dec_uint, ".egg"))
            .context(StrContext::Label("egg build number"))
            .parse_next(input)?;

        eof.context(StrContext::Label("end of egg filename"))
            .parse_next(input)?;

        Ok(EggFilename { name, version, build })
    }
}

impl Display for EggFilename {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}-{}-{}.egg", self.name, self.version, self.build)
    }
}

impl FromStr for EggFilename {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        EggFilename::parser
            .parse(input)
            .map_err(|_| Error::InvalidEggFilename(input.to_string()))
    }
}

impl TryFrom<&Path> for EggFilename {
    type Error = Error;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidEggFilename(path.display().to_string()))?;
        EggFilename::from_str(name)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("numpy-1.26.0-3.egg", true)]
    #[case("numpy-1.26.0-3.egg.asc", false)]
    #[case("numpy-1.26.0.egg", false)]
    #[case("numpy-1.26.0-beta.egg", false)]
    #[case("-1.26.0-3.egg", false)]
    fn egg_filename_from_str(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(EggFilename::from_str(input).is_ok(), ok);
    }

    #[test]
    fn egg_filename_round_trips_through_display() {
        let filename = EggFilename::from_str("scikits.learn-1.3.2-1.egg").unwrap();
        assert_eq!(filename.to_string(), "scikits.learn-1.3.2-1.egg");
    }
}
