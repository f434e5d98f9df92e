//! Error types for the handle registry

use spark_types::HandleFormatError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleRegistryError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid handle format. Use only lowercase letters, numbers, and hyphens (at most 20 characters).")]
    InvalidFormat {
        handle: String,
        #[source]
        source: HandleFormatError,
    },

    #[error("Handle is already registered and not expired")]
    AlreadyRegistered { handle: String },

    #[error("Handle not found")]
    NotFound { handle: String },

    #[error("Only the owner can renew this handle")]
    NotOwner { handle: String },

    #[error("Handle registration has expired")]
    HandleExpired { handle: String },
}

impl HandleRegistryError {
    /// Short machine-readable label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::AlreadyRegistered { .. } => "already_registered",
            Self::NotFound { .. } => "not_found",
            Self::NotOwner { .. } => "not_owner",
            Self::HandleExpired { .. } => "handle_expired",
        }
    }
}

pub type Result<T> = std::result::Result<T, HandleRegistryError>;
