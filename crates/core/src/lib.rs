//! Spark Core: the service facade over the handle registry and the
//! credential authority.
//!
//! Every operation answers with a tagged result value instead of an error,
//! so presentation layers can branch on the outcome and serialize it as is.

pub mod config;
pub mod demo;
pub mod errors;
pub mod results;
pub mod service;

pub use config::ServiceConfig;
pub use demo::{DEMO_CREDENTIAL_ID, DEMO_HANDLE};
pub use errors::*;
pub use results::*;
pub use service::SparkService;

pub use spark_credential_manager::{Credential, CredentialRequest, VerifiedCredential};
pub use spark_handle_registry::HandleRegistration;
pub use spark_types::{days_remaining, Amount, Principal, TimeNs};
