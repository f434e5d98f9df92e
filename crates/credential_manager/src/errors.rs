//! Error types for credential issuance, verification and revocation

use thiserror::Error;

/// Issuance failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Handle not found in registry")]
    HandleNotFound { handle: String },

    #[error("Only the handle owner can request credentials")]
    NotOwner { handle: String },

    #[error("Handle registration has expired")]
    HandleExpired { handle: String },

    #[error("Requested credential duration of {requested_secs}s is outside 1..={max_secs}s")]
    InvalidDuration { requested_secs: i64, max_secs: u64 },
}

impl CredentialError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::HandleNotFound { .. } => "handle_not_found",
            Self::NotOwner { .. } => "not_owner",
            Self::HandleExpired { .. } => "handle_expired",
            Self::InvalidDuration { .. } => "invalid_duration",
        }
    }
}

/// Why a credential failed verification, in precedence order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("Credential not found")]
    NotFound,

    #[error("Credential has been revoked")]
    Revoked,

    #[error("Credential has expired")]
    Expired,
}

/// Why a revocation was refused. Surfaced alongside the boolean revoke call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevokeError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Credential not found: {id}")]
    NotFound { id: String },

    #[error("Only the credential owner can revoke {id}")]
    NotOwner { id: String },
}

impl RevokeError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound { .. } => "not_found",
            Self::NotOwner { .. } => "not_owner",
        }
    }
}

pub type Result<T> = std::result::Result<T, CredentialError>;
