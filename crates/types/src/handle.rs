use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Marker every stored handle starts with.
pub const HANDLE_PREFIX: char = '@';

/// Maximum length of the name part of a handle (without the marker).
pub const MAX_HANDLE_LEN: usize = 20;

static HANDLE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("static handle pattern compiles"));

/// Reasons a handle name is rejected at registration time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandleFormatError {
    #[error("handle name is empty")]
    Empty,
    #[error("handle name '{0}' may only contain lowercase letters, digits and hyphens")]
    InvalidCharacters(String),
    #[error("handle name is {len} characters long, the limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Normalized handle, always stored as `@name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Normalize without validating. Used for lookups, where an unknown or
    /// malformed handle simply resolves to nothing.
    pub fn normalize(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref();
        if raw.starts_with(HANDLE_PREFIX) {
            Self(raw.to_string())
        } else {
            Self(format!("{HANDLE_PREFIX}{raw}"))
        }
    }

    /// Validate a bare name supplied for registration and add the marker.
    /// The raw input is checked as given, so a leading `@` is rejected.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, HandleFormatError> {
        let raw = raw.as_ref();
        validate_name(raw)?;
        Ok(Self(format!("{HANDLE_PREFIX}{raw}")))
    }

    /// The name part, without the leading marker.
    pub fn name(&self) -> &str {
        &self.0[HANDLE_PREFIX.len_utf8()..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name part satisfies the registration format.
    pub fn is_valid(&self) -> bool {
        validate_name(self.name()).is_ok()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_name(name: &str) -> Result<(), HandleFormatError> {
    if name.is_empty() {
        return Err(HandleFormatError::Empty);
    }
    if !HANDLE_NAME_PATTERN.is_match(name) {
        return Err(HandleFormatError::InvalidCharacters(name.to_string()));
    }
    // The pattern admits ASCII only, so byte length equals character count here.
    if name.len() > MAX_HANDLE_LEN {
        return Err(HandleFormatError::TooLong {
            len: name.len(),
            max: MAX_HANDLE_LEN,
        });
    }
    Ok(())
}
