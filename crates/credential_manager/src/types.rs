//! Types for the credential authority

use serde::{Deserialize, Serialize};
use spark_types::{Handle, Principal, TimeNs, MAX_CREDENTIAL_NS, ONE_DAY_NS};
use std::fmt;

/// Prefix of every generated credential id.
pub const CREDENTIAL_ID_PREFIX: &str = "cred-";

/// Opaque credential identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scoped, time-bound credential issued against a handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: CredentialId,
    /// Handle the credential was issued under.
    pub handle: Handle,
    /// Handle owner at issuance time.
    pub owner: Principal,
    pub scope: Vec<String>,
    pub issued_at: TimeNs,
    pub expires_at: TimeNs,
    /// Cleared by revocation, never set again.
    pub active: bool,
}

impl Credential {
    pub fn is_expired_at(&self, now: TimeNs) -> bool {
        self.expires_at <= now
    }

    pub fn is_valid_at(&self, now: TimeNs) -> bool {
        self.active && !self.is_expired_at(now)
    }
}

/// Successful verification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCredential {
    pub credential: Credential,
    /// Whole seconds until expiry, rounded down.
    pub remaining_time: u64,
}

/// Issuance request as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRequest {
    pub handle: String,
    #[serde(default)]
    pub scope: Vec<String>,
    /// Requested lifetime in seconds.
    pub duration: i64,
}

/// Which duration policy the authority applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicyKind {
    /// Out-of-range requests silently get the default lifetime.
    #[default]
    Clamp,
    /// Out-of-range requests fail with `InvalidDuration`.
    Reject,
}

/// Credential authority settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialConfig {
    pub duration_policy: DurationPolicyKind,
    pub default_lifetime_ns: u64,
    pub max_lifetime_ns: u64,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            duration_policy: DurationPolicyKind::default(),
            default_lifetime_ns: ONE_DAY_NS,
            max_lifetime_ns: MAX_CREDENTIAL_NS,
        }
    }
}
