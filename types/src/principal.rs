//! Opaque caller identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// An opaque, unique identifier for a caller (voter or administrator).
///
/// The election never interprets the identifier; it only compares principals
/// for equality. Who the caller is, and whether they administer the election,
/// is decided by an external access-control capability.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a principal from a raw identifier.
    ///
    /// # Panics
    /// Panics if the identifier is empty or contains whitespace.
    pub fn new(raw: impl Into<String>) -> Self {
        match Self::parse(raw) {
            Ok(principal) => principal,
            Err(e) => panic!("invalid principal: {e}"),
        }
    }

    /// Validate and wrap a raw identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ParseError> {
        let s = raw.into();
        if s.is_empty() {
            return Err(ParseError::EmptyPrincipal);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ParseError::PrincipalWhitespace(s));
        }
        Ok(Self(s))
    }

    /// Return the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Principal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}
