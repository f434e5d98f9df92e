//! Spark shared types
//!
//! Primitives used by both the handle registry and the credential authority:
//! caller identities, normalized handles, nanosecond timestamps and fee amounts.

pub mod currency;
pub mod handle;
pub mod principal;
pub mod timestamp;

pub use currency::*;
pub use handle::*;
pub use principal::*;
pub use timestamp::*;
