//! Fee amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in the smallest fee unit (cents for the demo deployment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    pub const fn units(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registration fee charged for a handle ($9.99 expressed in cents).
pub const DEFAULT_REGISTRATION_FEE: Amount = Amount(999);
