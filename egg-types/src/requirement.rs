//! Requirement parsing and matching.

use std::{fmt::Display, str::FromStr};

use crate::{EggName, EggVersion, Error, PackageMetadata};

/// A parsed requirement string: `"name"`, `"name version"`, or `"name version-build"` (the
/// canonical, fully-pinned form produced by `split_eggname`-style formatting), plus a
/// space-separated `"name version build"` form accepted as an alias for the latter.
///
/// The number of fields present is the requirement's strictness: 0 for the wildcard (no name), 1
/// for name only, 2 for name + version, 3 for name + version + build. Strictness 0 cannot be
/// produced by [`Requirement::new`] on non-empty input; only [`Requirement::wildcard`] yields it.
///
/// ## Examples
/// ```
/// use egg_types::Requirement;
///
/// let req = Requirement::new("numpy 1.26.0-3").unwrap();
/// assert_eq!(req.strictness(), 3);
/// assert_eq!(Requirement::new("numpy").unwrap().strictness(), 1);
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Requirement {
    name: Option<EggName>,
    version: Option<EggVersion>,
    build: Option<u32>,
}

impl Requirement {
    /// Returns the requirement that matches nothing, i.e. strictness 0.
    pub fn wildcard() -> Self {
        Requirement { name: None, version: None, build: None }
    }

    /// Parses a requirement string of the form `"name"`, `"name version"`,
    /// `"name version-build"` or `"name version build"`.
    ///
    /// When exactly two whitespace-separated tokens are given and the second contains a `-`, it
    /// is split on its last `-` into a version and a build, reaching strictness 3 from the
    /// canonical `"name version-build"` form (`enpkg.py`'s `'%s %s-%d' % split_eggname(arg)`).
    /// Three whitespace-separated tokens (`"name version build"`) are accepted as an equivalent,
    /// explicit alternative.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or version components are malformed, if the build component
    /// is not a non-negative integer, or if more than three whitespace-separated tokens are
    /// given.
    pub fn new(input: &str) -> Result<Self, Error> {
        let mut tokens = input.split_whitespace();

        let name = match tokens.next() {
            Some(token) => Some(EggName::new(token)?),
            None => return Ok(Requirement::wildcard()),
        };
        let second = tokens.next();
        let third = tokens.next();
        if tokens.next().is_some() {
            return Err(Error::InvalidRequirement(input.to_string()));
        }

        let (version, build) = match (second, third) {
            (None, None) => (None, None),
            (Some(version_token), Some(build_token)) => {
                let version = EggVersion::new(version_token)?;
                let build = build_token.parse::<u32>().map_err(|_| Error::InvalidRequirement(input.to_string()))?;
                (Some(version), Some(build))
            }
            (Some(token), None) => match token.rsplit_once('-').and_then(|(version_part, build_part)| {
                build_part.parse::<u32>().ok().map(|build| (version_part, build))
            }) {
                Some((version_part, build)) => (Some(EggVersion::new(version_part)?), Some(build)),
                None => (Some(EggVersion::new(token)?), None),
            },
            (None, Some(_)) => unreachable!("split_whitespace cannot yield a third token without a second"),
        };

        Ok(Requirement { name, version, build })
    }

    /// Returns the name component, if the requirement is more specific than a wildcard.
    pub fn name(&self) -> Option<&EggName> {
        self.name.as_ref()
    }

    /// Returns the version component.
    pub fn version(&self) -> Option<&EggVersion> {
        self.version.as_ref()
    }

    /// Returns the build component.
    pub fn build(&self) -> Option<u32> {
        self.build
    }

    /// Returns how many of (name, version, build) this requirement pins: 0, 1, 2 or 3.
    pub fn strictness(&self) -> u8 {
        match (&self.name, &self.version, self.build) {
            (None, _, _) => 0,
            (Some(_), None, _) => 1,
            (Some(_), Some(_), None) => 2,
            (Some(_), Some(_), Some(_)) => 3,
        }
    }

    /// Tests whether `record` satisfies this requirement.
    ///
    /// The name must match, canonicalized and case-insensitively (which falls out of
    /// [`EggName`]'s own canonicalization); every other field present in the requirement must
    /// equal the record's corresponding field exactly. A wildcard requirement (strictness 0)
    /// matches nothing, since it names no package to query for.
    pub fn matches(&self, record: &PackageMetadata) -> bool {
        let Some(name) = &self.name else {
            return false;
        };
        if name != record.name() {
            return false;
        }
        if let Some(version) = &self.version {
            if version != record.version() {
                return false;
            }
        }
        if let Some(build) = self.build {
            if build != record.build() {
                return false;
            }
        }
        true
    }
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Requirement::new(input)
    }
}

impl Display for Requirement {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(name) = &self.name else {
            return write!(fmt, "");
        };
        write!(fmt, "{name}")?;
        if let Some(version) = &self.version {
            write!(fmt, " {version}")?;
            if let Some(build) = self.build {
                write!(fmt, " {build}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn record(name: &str, version: &str, build: u32) -> PackageMetadata {
        PackageMetadata::builder(name, version, build).build().unwrap()
    }

    #[rstest]
    #[case("", 0)]
    #[case("numpy", 1)]
    #[case("numpy 1.26.0", 2)]
    #[case("numpy 1.26.0 3", 3)]
    #[case("numpy 1.26.0-3", 3)]
    fn requirement_strictness(#[case] input: &str, #[case] expected: u8) {
        assert_eq!(Requirement::new(input).unwrap().strictness(), expected);
    }

    #[test]
    fn requirement_new_rejects_extra_tokens() {
        assert!(Requirement::new("numpy 1.26.0 3 extra").is_err());
    }

    #[test]
    fn requirement_new_rejects_non_integer_build() {
        assert!(Requirement::new("numpy 1.26.0 latest").is_err());
    }

    #[test]
    fn canonical_hyphenated_form_parses_the_same_as_the_space_separated_form() {
        let hyphenated = Requirement::new("numpy 1.26.0-3").unwrap();
        let spaced = Requirement::new("numpy 1.26.0 3").unwrap();
        assert_eq!(hyphenated, spaced);
        assert_eq!(hyphenated.version().unwrap().as_str(), "1.26.0");
        assert_eq!(hyphenated.build(), Some(3));
    }

    #[test]
    fn hyphenated_token_with_a_non_numeric_suffix_is_rejected() {
        // A hyphen always separates version from build in this grammar (versions themselves
        // cannot contain one), so a non-numeric suffix after the last `-` is simply invalid.
        assert!(Requirement::new("numpy 1.26.0-rc1").is_err());
    }

    #[rstest]
    #[case("NumPy", true)]
    #[case("scipy", false)]
    fn requirement_matches_is_case_insensitive_on_name(#[case] name: &str, #[case] expected: bool) {
        let req = Requirement::new(name).unwrap();
        assert_eq!(req.matches(&record("numpy", "1.26.0", 3)), expected);
    }

    #[test]
    fn requirement_matches_checks_every_present_field() {
        let exact = Requirement::new("numpy 1.26.0 3").unwrap();
        assert!(exact.matches(&record("numpy", "1.26.0", 3)));
        assert!(!exact.matches(&record("numpy", "1.26.0", 4)));

        let name_only = Requirement::new("numpy").unwrap();
        assert!(name_only.matches(&record("numpy", "1.0.0", 1)));
    }

    #[test]
    fn wildcard_matches_nothing() {
        assert!(!Requirement::wildcard().matches(&record("numpy", "1.26.0", 3)));
    }

    proptest! {
        #[test]
        fn fully_pinned_requirement_matches_its_own_record(
            name in "[a-z][a-z0-9]{0,9}",
            version in "[0-9]{1,2}(\\.[0-9]{1,2}){0,2}",
            build in 0u32..1000,
        ) {
            let record = record(&name, &version, build);
            let req = Requirement::new(&format!("{name} {version}-{build}")).unwrap();
            prop_assert_eq!(req.strictness(), 3);
            prop_assert!(req.matches(&record));
        }
    }
}
