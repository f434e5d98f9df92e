//! Demo data seeded at startup when `seed_demo_data` is set.

use crate::errors::*;
use crate::service::SparkService;
use spark_credential_manager::{CredentialId, IdGenerator, PrefilledIdGenerator};
use spark_types::Principal;
use std::sync::Arc;
use tracing::info;

pub const DEMO_HANDLE: &str = "spark-demo";
pub const DEMO_CREDENTIAL_ID: &str = "cred-abcdef1234567890";
const DEMO_SCOPE: [&str; 2] = ["read", "write"];
const DEMO_CREDENTIAL_SECS: i64 = 86_400;

/// Wrap `fallback` so the first id drawn is the demo credential's id.
pub(crate) fn id_generator(fallback: Arc<dyn IdGenerator>) -> Arc<dyn IdGenerator> {
    Arc::new(PrefilledIdGenerator::new(
        [CredentialId::new(DEMO_CREDENTIAL_ID)],
        fallback,
    ))
}

/// Register the demo handle to the demo principal and issue its credential.
/// Must run before any other issuance so the well-known id is used.
pub(crate) fn seed(service: &SparkService) -> Result<()> {
    let owner = Principal::demo();
    let registration = service
        .registry()
        .register_handle(DEMO_HANDLE, Some(&owner))
        .map_err(ServiceError::DemoRegistration)?;

    let scope = DEMO_SCOPE.iter().map(|s| s.to_string()).collect();
    let credential = service
        .authority()
        .issue_credential(DEMO_HANDLE, scope, DEMO_CREDENTIAL_SECS, Some(&owner))
        .map_err(ServiceError::DemoIssuance)?;

    info!(
        handle = %registration.handle,
        owner = %owner,
        credential_id = %credential.id,
        "demo data seeded"
    );
    Ok(())
}
