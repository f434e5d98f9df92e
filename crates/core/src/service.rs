//! The Spark service facade

use crate::config::ServiceConfig;
use crate::demo;
use crate::errors::*;
use crate::results::*;
use spark_credential_manager::{
    Credential, CredentialAuthority, CredentialRequest, IdGenerator, RandomIdGenerator,
};
use spark_handle_registry::{HandleRegistration, HandleRegistry};
use spark_time::SharedClock;
use spark_types::{Amount, Principal, TimeNs};
use std::sync::Arc;
use tracing::debug;

/// One handle registry and one credential authority over a shared clock.
///
/// `caller` is the identity asserted by the authentication layer in front of
/// the service; `None` means the request is anonymous.
#[derive(Debug, Clone)]
pub struct SparkService {
    registry: Arc<HandleRegistry>,
    authority: Arc<CredentialAuthority>,
}

impl SparkService {
    /// Default settings, no demo data.
    pub fn new(clock: SharedClock) -> Self {
        let registry = Arc::new(HandleRegistry::new(clock));
        Self::from_authority(CredentialAuthority::new(registry))
    }

    pub fn with_config(config: &ServiceConfig, clock: SharedClock) -> Result<Self> {
        Self::with_id_generator(config, clock, Arc::new(RandomIdGenerator))
    }

    /// Build from `config`, drawing credential ids from `ids`.
    pub fn with_id_generator(
        config: &ServiceConfig,
        clock: SharedClock,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self> {
        config.validate()?;

        let ids = if config.seed_demo_data {
            demo::id_generator(ids)
        } else {
            ids
        };
        let registry = Arc::new(HandleRegistry::with_config(config.registry.clone(), clock));
        let authority =
            CredentialAuthority::with_config(registry, &config.credentials).with_id_generator(ids);

        let service = Self::from_authority(authority);
        if config.seed_demo_data {
            demo::seed(&service)?;
        }
        Ok(service)
    }

    /// Wrap an existing authority together with the registry it consults.
    pub fn from_authority(authority: CredentialAuthority) -> Self {
        Self {
            registry: authority.registry().clone(),
            authority: Arc::new(authority),
        }
    }

    pub fn registry(&self) -> &Arc<HandleRegistry> {
        &self.registry
    }

    pub fn authority(&self) -> &Arc<CredentialAuthority> {
        &self.authority
    }

    pub fn now(&self) -> TimeNs {
        self.registry.clock().now()
    }

    pub fn get_registration_fee(&self) -> Amount {
        self.registry.registration_fee()
    }

    pub fn is_handle_available(&self, handle: &str) -> bool {
        self.registry.is_handle_available(handle)
    }

    pub fn register_handle(&self, handle: &str, caller: Option<&Principal>) -> RegistrationResult {
        let result = self.registry.register_handle(handle, caller);
        if let Err(error) = &result {
            debug!(handle, reason = error.kind(), "registration refused");
        }
        result.into()
    }

    pub fn renew_handle(&self, handle: &str, caller: Option<&Principal>) -> RenewalResult {
        let result = self.registry.renew_handle(handle, caller);
        if let Err(error) = &result {
            debug!(handle, reason = error.kind(), "renewal refused");
        }
        result.into()
    }

    pub fn lookup_handle(&self, handle: &str) -> LookupResult {
        match self.registry.lookup_handle(handle) {
            Ok(registration) => LookupResult::Success(registration),
            Err(_) => LookupResult::NotFound(()),
        }
    }

    pub fn get_handles_by_owner(&self, owner: &Principal) -> Vec<HandleRegistration> {
        self.registry.handles_by_owner(owner)
    }

    pub fn issue_credential(
        &self,
        request: &CredentialRequest,
        caller: Option<&Principal>,
    ) -> IssueResult {
        let result = self.authority.issue_credential(
            &request.handle,
            request.scope.clone(),
            request.duration,
            caller,
        );
        if let Err(error) = &result {
            debug!(handle = %request.handle, reason = error.kind(), "issuance refused");
        }
        result.into()
    }

    pub fn verify_credential(&self, id: &str) -> VerifyResult {
        self.authority.verify_credential(id).into()
    }

    pub fn revoke_credential(&self, id: &str, caller: Option<&Principal>) -> bool {
        self.authority.revoke_credential(id, caller)
    }

    pub fn get_credentials_by_owner(&self, owner: &Principal) -> Vec<Credential> {
        self.authority.credentials_by_owner(owner)
    }

    pub fn get_credentials_by_handle(&self, handle: &str) -> Vec<Credential> {
        self.authority.credentials_by_handle(handle)
    }

    /// Whole days left on a registration, zero once it has lapsed.
    pub fn days_remaining(&self, registration: &HandleRegistration) -> u64 {
        spark_types::days_remaining(registration.expires_at, self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{DEMO_CREDENTIAL_ID, DEMO_HANDLE};
    use spark_credential_manager::SequentialIdGenerator;
    use spark_time::ManualClock;
    use spark_types::{NANOS_PER_SECOND, ONE_YEAR_NS};

    fn principal(name: &str) -> Principal {
        Principal::from_text(name).unwrap()
    }

    fn service() -> (SparkService, Arc<ManualClock>) {
        let clock = ManualClock::shared(TimeNs::ZERO);
        (SparkService::new(clock.clone()), clock)
    }

    #[test]
    fn anonymous_calls_are_refused() {
        let (service, _) = service();
        assert_eq!(
            service.register_handle("agent007", None),
            RegistrationResult::Error("Not authenticated".into())
        );
        let request = CredentialRequest {
            handle: "agent007".into(),
            scope: vec![],
            duration: 60,
        };
        assert_eq!(
            service.issue_credential(&request, None),
            IssueResult::Error("Not authenticated".into())
        );
        assert!(!service.revoke_credential("cred-0000000000000001", None));
    }

    #[test]
    fn lookup_reports_not_found() {
        let (service, _) = service();
        assert_eq!(service.lookup_handle("ghost"), LookupResult::NotFound(()));

        let alice = principal("alice");
        assert!(!service.register_handle("@alice", Some(&alice)).is_success());
        assert!(service.register_handle("alice", Some(&alice)).is_success());
        let found = service.lookup_handle("@alice").success().unwrap();
        assert_eq!(found.owner, alice);
    }

    #[test]
    fn renewal_errors_are_reported_as_text() {
        let (service, _) = service();
        service.register_handle("alice", Some(&principal("alice")));
        assert_eq!(
            service.renew_handle("alice", Some(&principal("mallory"))),
            RenewalResult::Error("Only the owner can renew this handle".into())
        );
        assert_eq!(
            service.renew_handle("nobody", Some(&principal("alice"))),
            RenewalResult::Error("Handle not found".into())
        );
    }

    #[test]
    fn days_remaining_counts_down_to_zero() {
        let (service, clock) = service();
        let registration = service
            .register_handle("alice", Some(&principal("alice")))
            .success()
            .unwrap();
        assert_eq!(service.days_remaining(&registration), 365);

        clock.advance_secs(364 * 86_400 + 1);
        assert_eq!(service.days_remaining(&registration), 0);

        clock.advance_nanos(ONE_YEAR_NS);
        assert_eq!(service.days_remaining(&registration), 0);
    }

    #[test]
    fn demo_seeding_registers_handle_and_credential() {
        let clock = ManualClock::shared(TimeNs::from_secs(1_000));
        let config = ServiceConfig {
            seed_demo_data: true,
            ..ServiceConfig::default()
        };
        let service = SparkService::with_id_generator(
            &config,
            clock.clone(),
            Arc::new(SequentialIdGenerator::new()),
        )
        .unwrap();

        let demo = Principal::demo();
        let handles = service.get_handles_by_owner(&demo);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].handle.name(), DEMO_HANDLE);
        assert!(!service.is_handle_available(DEMO_HANDLE));

        match service.verify_credential(DEMO_CREDENTIAL_ID) {
            VerifyResult::Valid(verified) => {
                assert_eq!(verified.credential.scope, vec!["read", "write"]);
                assert_eq!(verified.remaining_time, 86_400);
            }
            other => panic!("unexpected {other:?}"),
        }

        let request = CredentialRequest {
            handle: DEMO_HANDLE.into(),
            scope: vec!["read".into()],
            duration: 60,
        };
        let next = service
            .issue_credential(&request, Some(&demo))
            .success()
            .unwrap();
        assert_eq!(next.id.as_str(), "cred-0000000000000001");
        assert_eq!(
            next.expires_at.as_nanos() - next.issued_at.as_nanos(),
            60 * NANOS_PER_SECOND
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ServiceConfig::default();
        config.registry.registration_period_ns = 0;
        let result = SparkService::with_config(&config, ManualClock::shared(TimeNs::ZERO));
        assert!(matches!(
            result,
            Err(ServiceError::Config(crate::ConfigError::ZeroRegistrationPeriod))
        ));
    }
}
