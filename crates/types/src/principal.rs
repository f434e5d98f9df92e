//! Opaque caller identities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Principal used by the demo deployment (the anonymous principal text).
pub const DEMO_PRINCIPAL: &str = "2vxsx-fae";

/// Errors raised while parsing a principal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("principal text must not be empty")]
    Empty,
}

/// Identity of a caller, compared by its canonical textual form.
///
/// Authentication happens outside this workspace; a `Principal` is only ever
/// an assertion handed in by that collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Parse a principal from its textual form. Surrounding whitespace is ignored.
    pub fn from_text(text: impl AsRef<str>) -> Result<Self, PrincipalError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(PrincipalError::Empty);
        }
        Ok(Self(text.to_string()))
    }

    /// The demo principal that owns seeded data.
    pub fn demo() -> Self {
        Self(DEMO_PRINCIPAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}
