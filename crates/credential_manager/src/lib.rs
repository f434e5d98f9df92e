//! Spark Credential Manager
//!
//! Issues short-lived credentials carrying a caller-supplied scope against a
//! handle the caller currently owns. Credentials are verified by id and can
//! be revoked by their owner; revocation is one-way. Like registrations,
//! credential expiry is derived from `expires_at` at read time.

pub mod authority;
pub mod errors;
pub mod ids;
pub mod policy;
pub mod types;

pub use authority::CredentialAuthority;
pub use errors::*;
pub use ids::*;
pub use policy::*;
pub use types::*;
