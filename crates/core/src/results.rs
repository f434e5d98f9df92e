//! Tagged operation results
//!
//! Each enum serializes externally tagged in camelCase, e.g.
//! `{"success": {...}}`, `{"error": "Handle not found"}` or
//! `{"notFound": null}`.

use serde::{Deserialize, Serialize};
use spark_credential_manager::{
    Credential, CredentialError, InvalidReason, VerifiedCredential,
};
use spark_handle_registry::{HandleRegistration, HandleRegistryError};

/// Outcome of `register_handle` and `renew_handle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationResult {
    Success(HandleRegistration),
    Error(String),
}

pub type RenewalResult = RegistrationResult;

impl RegistrationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(self) -> Option<HandleRegistration> {
        match self {
            Self::Success(registration) => Some(registration),
            Self::Error(_) => None,
        }
    }
}

impl From<Result<HandleRegistration, HandleRegistryError>> for RegistrationResult {
    fn from(result: Result<HandleRegistration, HandleRegistryError>) -> Self {
        match result {
            Ok(registration) => Self::Success(registration),
            Err(error) => Self::Error(error.to_string()),
        }
    }
}

/// Outcome of `lookup_handle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupResult {
    Success(HandleRegistration),
    NotFound(()),
}

impl LookupResult {
    pub fn success(self) -> Option<HandleRegistration> {
        match self {
            Self::Success(registration) => Some(registration),
            Self::NotFound(()) => None,
        }
    }
}

/// Outcome of `issue_credential`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueResult {
    Success(Credential),
    Error(String),
}

impl IssueResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(self) -> Option<Credential> {
        match self {
            Self::Success(credential) => Some(credential),
            Self::Error(_) => None,
        }
    }
}

impl From<Result<Credential, CredentialError>> for IssueResult {
    fn from(result: Result<Credential, CredentialError>) -> Self {
        match result {
            Ok(credential) => Self::Success(credential),
            Err(error) => Self::Error(error.to_string()),
        }
    }
}

/// Outcome of `verify_credential`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerifyResult {
    Valid(VerifiedCredential),
    Invalid(String),
}

impl VerifyResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl From<Result<VerifiedCredential, InvalidReason>> for VerifyResult {
    fn from(result: Result<VerifiedCredential, InvalidReason>) -> Self {
        match result {
            Ok(verified) => Self::Valid(verified),
            Err(reason) => Self::Invalid(reason.to_string()),
        }
    }
}
