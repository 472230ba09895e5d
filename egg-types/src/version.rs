//! Version parsing and comparison.

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use crate::Error;

/// A single token of a tokenized version string.
///
/// Version strings are split into alternating runs of digits and letters, with everything else
/// (`.`, `-`, `_`, `+`, ...) acting as a separator that is discarded. A numeric run always
/// compares as newer than an alphabetic run in the same position, which is what gives
/// pre-release suffixes such as `a`, `b`, `rc`, `dev` their lower rank: `1.0` is newer than
/// `1.0rc1`, because at the position where `1.0` has run out of tokens and `1.0rc1` has an
/// alphabetic token, the exhausted side is treated as numeric.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Num(u128),
    Alpha(String),
}

fn tokenize(version: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = version.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = digits.trim_start_matches('0').parse().unwrap_or(0);
            segments.push(Segment::Num(value));
        } else if c.is_alphabetic() {
            let mut letters = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphabetic() {
                    letters.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            segments.push(Segment::Alpha(letters.to_ascii_lowercase()));
        } else {
            chars.next();
        }
    }
    segments
}

fn cmp_slot(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(Segment::Num(_))) => Ordering::Less,
        (None, Some(Segment::Alpha(_))) => Ordering::Greater,
        (Some(Segment::Num(_)), None) => Ordering::Greater,
        (Some(Segment::Alpha(_)), None) => Ordering::Less,
        (Some(Segment::Num(x)), Some(Segment::Num(y))) => x.cmp(y),
        (Some(Segment::Alpha(x)), Some(Segment::Alpha(y))) => x.cmp(y),
        (Some(Segment::Num(_)), Some(Segment::Alpha(_))) => Ordering::Greater,
        (Some(Segment::Alpha(_)), Some(Segment::Num(_))) => Ordering::Less,
    }
}

/// A version string turned into a totally ordered value.
///
/// Two versions that tokenize identically compare as equal, regardless of separator characters
/// (`1.0.0` and `1-0-0` are equal). Versions that are structurally identical up to where one runs
/// out of tokens are ordered using [`cmp_slot`], which is what implements alpha/beta/rc
/// pre-release ordering.
///
/// The ordering is a total preorder: any two [`ComparableVersion`]s can be compared, there is no
/// "non-parseable" failure mode, which trivially satisfies the requirement that sorting a mixed
/// list of versions never fails.
///
/// ## Examples
/// ```
/// use egg_types::ComparableVersion;
///
/// assert!(ComparableVersion::new("1.2.0") > ComparableVersion::new("1.1.9"));
/// assert!(ComparableVersion::new("2.0.0") > ComparableVersion::new("2.0.0rc1"));
/// assert!(ComparableVersion::new("2.0.0rc1") > ComparableVersion::new("2.0.0beta1"));
/// assert_eq!(ComparableVersion::new("1.0.0"), ComparableVersion::new("1.0.0"));
/// ```
#[derive(Clone, Debug, Eq)]
pub struct ComparableVersion {
    raw: String,
    tokens: Vec<Segment>,
}

impl ComparableVersion {
    /// Creates a new [`ComparableVersion`] from a version string.
    ///
    /// This never fails: any string can be tokenized, even if it yields an empty token list.
    pub fn new(version: &str) -> Self {
        ComparableVersion {
            raw: version.to_string(),
            tokens: tokenize(version),
        }
    }

    /// Returns the original, un-tokenized version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<&str> for ComparableVersion {
    fn from(value: &str) -> Self {
        ComparableVersion::new(value)
    }
}

impl Display for ComparableVersion {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.raw)
    }
}

impl Ord for ComparableVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.tokens.len().max(other.tokens.len());
        for i in 0..len {
            let ord = cmp_slot(self.tokens.get(i), other.tokens.get(i));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ComparableVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ComparableVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

/// The version component of an egg, i.e. everything between the name and the build number in
/// `<name>-<version>-<build>.egg`.
///
/// A version must be non-empty and must not contain a hyphen, since the hyphen is the separator
/// between the three components of an egg filename.
///
/// ## Examples
/// ```
/// use egg_types::EggVersion;
///
/// assert!(EggVersion::new("1.2.0-4").is_err());
/// assert!(EggVersion::new("1.2.0").is_ok());
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EggVersion(String);

impl EggVersion {
    /// Creates a new [`EggVersion`].
    ///
    /// # Errors
    ///
    /// Returns an error if `version` is empty or contains a hyphen.
    pub fn new(version: &str) -> Result<Self, Error> {
        if version.is_empty() || version.contains('-') {
            return Err(Error::InvalidEggFilename(version.to_string()));
        }
        Ok(EggVersion(version.to_string()))
    }

    /// Returns the version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a [`ComparableVersion`] for this version, for use as a sort key.
    pub fn comparable(&self) -> ComparableVersion {
        ComparableVersion::new(&self.0)
    }
}

impl FromStr for EggVersion {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        EggVersion::new(input)
    }
}

impl Display for EggVersion {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", "1", Ordering::Equal)]
    #[case("2", "1", Ordering::Greater)]
    #[case("1", "2", Ordering::Less)]
    #[case("1.1", "1", Ordering::Greater)]
    #[case("1.2.0", "1.1.9", Ordering::Greater)]
    #[case("1.0.0", "1.0.0rc1", Ordering::Greater)]
    #[case("1.0.0rc1", "1.0.0beta1", Ordering::Greater)]
    #[case("1.0.0beta2", "1.0.0beta1", Ordering::Greater)]
    #[case("1.0.0", "1-0-0", Ordering::Equal)]
    #[case("10.0", "9.0", Ordering::Greater)]
    fn comparable_version_cmp(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(ComparableVersion::new(a).cmp(&ComparableVersion::new(b)), expected);
    }

    #[test]
    fn comparable_version_sort_orders_mixed_releases() {
        let mut versions = vec!["1.0.0", "1.0.0rc1", "0.9.0", "1.0.0beta1", "1.1.0"]
            .into_iter()
            .map(ComparableVersion::new)
            .collect::<Vec<_>>();
        versions.sort();
        let sorted = versions.iter().map(ComparableVersion::as_str).collect::<Vec<_>>();
        assert_eq!(sorted, vec!["0.9.0", "1.0.0beta1", "1.0.0rc1", "1.0.0", "1.1.0"]);
    }

    #[rstest]
    #[case("1.0.0", true)]
    #[case("", false)]
    #[case("1.0-0", false)]
    fn egg_version_new(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(EggVersion::new(input).is_ok(), ok);
    }

    proptest! {
        #[test]
        fn comparable_version_never_fails_to_order_arbitrary_strings(a in ".*", b in ".*") {
            // `cmp` must not panic and must be a strict total order: antisymmetric and reflexive.
            let (va, vb) = (ComparableVersion::new(&a), ComparableVersion::new(&b));
            prop_assert_eq!(va.cmp(&va), Ordering::Equal);
            prop_assert_eq!(va.cmp(&vb), vb.cmp(&va).reverse());
        }

        #[test]
        fn incrementing_the_last_numeric_run_always_sorts_higher(prefix in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}", bump in 1u32..100) {
            let lower = ComparableVersion::new(&prefix);
            let higher_raw = format!("{prefix}.{bump}");
            let higher = ComparableVersion::new(&higher_raw);
            prop_assert!(higher > lower);
        }
    }
}
