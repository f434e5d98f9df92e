//! Spark Handle Registry
//!
//! Maps human-readable handles (`@name`) to the principal that registered
//! them. Registrations run for a fixed period and can be renewed by their
//! owner; once a registration lapses anyone may register the handle again.
//! Expiry is never stored, it is always derived from `expires_at` and the
//! current clock reading.

pub mod errors;
pub mod registry;
pub mod types;

pub use errors::*;
pub use registry::HandleRegistry;
pub use types::*;
