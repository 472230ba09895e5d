//! Egg name canonicalization.

use std::{fmt::Display, str::FromStr};

use crate::Error;

/// The canonical name of an egg.
///
/// Names are canonicalized by lowering ASCII characters only; anything else in the string is
/// left untouched. Two names are equal iff their canonical forms are equal, which is what makes
/// name comparisons in [`crate::Requirement::matches`] case-insensitive.
///
/// ## Examples
/// ```
/// use egg_types::EggName;
///
/// assert_eq!(EggName::new("NumPy").unwrap(), EggName::new("numpy").unwrap());
/// assert!(EggName::new("").is_err());
/// assert!(EggName::new("num py").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EggName(String);

impl EggName {
    /// Creates a new [`EggName`], canonicalizing it to ASCII-lowercase.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty or contains whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(EggName(name.to_ascii_lowercase()))
    }

    /// Returns the canonical name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EggName {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        EggName::new(input)
    }
}

impl Display for EggName {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("foo", Ok("foo"))]
    #[case("FOO", Ok("foo"))]
    #[case("FooBar", Ok("foobar"))]
    #[case("", Err(()))]
    #[case("foo bar", Err(()))]
    fn egg_name(#[case] input: &str, #[case] expected: Result<&str, ()>) {
        match expected {
            Ok(name) => assert_eq!(EggName::new(input).unwrap().as_str(), name),
            Err(()) => assert!(EggName::new(input).is_err()),
        }
    }
}
