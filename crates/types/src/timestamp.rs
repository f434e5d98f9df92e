//! Nanosecond timestamps and the durations the registry and authority work in.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
pub const ONE_DAY_NS: u64 = SECONDS_PER_DAY * NANOS_PER_SECOND;
/// A registration year is a flat 365 days.
pub const ONE_YEAR_NS: u64 = 365 * ONE_DAY_NS;
/// Upper bound on the lifetime of an issued credential.
pub const MAX_CREDENTIAL_NS: u64 = 30 * ONE_DAY_NS;

/// Nanoseconds since the UNIX epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeNs(pub u64);

impl TimeNs {
    pub const ZERO: TimeNs = TimeNs(0);

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(NANOS_PER_SECOND))
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Whole seconds, rounded down.
    pub const fn as_secs(&self) -> u64 {
        self.0 / NANOS_PER_SECOND
    }

    pub const fn saturating_add_nanos(self, nanos: u64) -> Self {
        Self(self.0.saturating_add(nanos))
    }

    /// Nanoseconds from `earlier` to `self`, zero if `earlier` is later.
    pub const fn saturating_nanos_since(self, earlier: TimeNs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for TimeNs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// Whole days left until `expires_at`, never negative.
pub fn days_remaining(expires_at: TimeNs, now: TimeNs) -> u64 {
    expires_at.saturating_nanos_since(now) / ONE_DAY_NS
}
