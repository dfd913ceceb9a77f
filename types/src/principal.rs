//! Principal identity type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// An acting identity: a Guardian, a Delegate, an Admin, a depositor, or the
/// reference to an external action target.
///
/// Principals are opaque to the engine. The only structural rule is that the
/// identity is non-empty and contains no whitespace, so it can be used as a
/// storage key and printed unambiguously.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    /// Create a principal from a raw string without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse and validate a principal.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let p = Self(raw.to_string());
        if p.is_valid() {
            Ok(p)
        } else {
            Err(TypesError::InvalidPrincipal(raw.to_string()))
        }
    }

    /// Return the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
