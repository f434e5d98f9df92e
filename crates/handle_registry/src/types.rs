//! Types for the handle registry

use serde::{Deserialize, Serialize};
use spark_types::{Amount, Handle, Principal, TimeNs, DEFAULT_REGISTRATION_FEE, ONE_YEAR_NS};

/// Registration record for a single handle.
///
/// A record is replaced wholesale when an expired handle is registered again,
/// and otherwise only changed by renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleRegistration {
    pub handle: Handle,
    pub owner: Principal,
    pub registered_at: TimeNs,
    pub expires_at: TimeNs,
    /// Number of successful renewals since the record was (re)created.
    pub renewed: u64,
}

impl HandleRegistration {
    /// Live means unexpired: `now < expires_at`.
    pub fn is_live_at(&self, now: TimeNs) -> bool {
        now < self.expires_at
    }

    pub fn is_expired_at(&self, now: TimeNs) -> bool {
        !self.is_live_at(now)
    }

    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        &self.owner == principal
    }
}

/// What renewal does with a record whose registration has already lapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiredRenewal {
    /// The recorded owner may still renew, which reclaims the handle as long
    /// as nobody else registered it in the meantime.
    #[default]
    Reclaim,
    /// Renewal of a lapsed record fails with `HandleExpired`.
    Reject,
}

/// Registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub registration_fee: Amount,
    /// Length of one registration or renewal period, in nanoseconds.
    pub registration_period_ns: u64,
    pub expired_renewal: ExpiredRenewal,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registration_fee: DEFAULT_REGISTRATION_FEE,
            registration_period_ns: ONE_YEAR_NS,
            expired_renewal: ExpiredRenewal::default(),
        }
    }
}
