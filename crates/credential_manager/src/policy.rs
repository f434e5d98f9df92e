//! Credential lifetime policies.
//!
//! The authority never interprets the requested duration itself; it asks a
//! [`DurationPolicy`] for the lifetime to grant.

use crate::errors::{CredentialError, Result};
use crate::types::{CredentialConfig, DurationPolicyKind};
use spark_types::NANOS_PER_SECOND;
use std::fmt;
use std::sync::Arc;

pub trait DurationPolicy: Send + Sync + fmt::Debug {
    /// Lifetime in nanoseconds for a request of `requested_secs` seconds.
    fn lifetime_ns(&self, requested_secs: i64) -> Result<u64>;
}

fn requested_nanos(requested_secs: i64) -> i128 {
    i128::from(requested_secs) * i128::from(NANOS_PER_SECOND)
}

/// Grants the request when it lies in `(0, max_ns]`, otherwise `default_ns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampToDefault {
    pub default_ns: u64,
    pub max_ns: u64,
}

impl DurationPolicy for ClampToDefault {
    fn lifetime_ns(&self, requested_secs: i64) -> Result<u64> {
        let requested = requested_nanos(requested_secs);
        if requested > 0 && requested <= i128::from(self.max_ns) {
            // Bounded by max_ns above, so the narrowing cannot fail.
            Ok(u64::try_from(requested).unwrap_or(self.default_ns))
        } else {
            Ok(self.default_ns)
        }
    }
}

/// Grants the request when it lies in `(0, max_ns]`, otherwise fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectInvalid {
    pub max_ns: u64,
}

impl DurationPolicy for RejectInvalid {
    fn lifetime_ns(&self, requested_secs: i64) -> Result<u64> {
        let requested = requested_nanos(requested_secs);
        if requested > 0 && requested <= i128::from(self.max_ns) {
            if let Ok(lifetime) = u64::try_from(requested) {
                return Ok(lifetime);
            }
        }
        Err(CredentialError::InvalidDuration {
            requested_secs,
            max_secs: self.max_ns / NANOS_PER_SECOND,
        })
    }
}

impl CredentialConfig {
    /// Build the policy this configuration selects.
    pub fn duration_policy(&self) -> Arc<dyn DurationPolicy> {
        match self.duration_policy {
            DurationPolicyKind::Clamp => Arc::new(ClampToDefault {
                default_ns: self.default_lifetime_ns,
                max_ns: self.max_lifetime_ns,
            }),
            DurationPolicyKind::Reject => Arc::new(RejectInvalid {
                max_ns: self.max_lifetime_ns,
            }),
        }
    }
}
