//! Credential authority implementation

use crate::errors::*;
use crate::ids::{IdGenerator, RandomIdGenerator};
use crate::policy::DurationPolicy;
use crate::types::*;
use parking_lot::RwLock;
use spark_handle_registry::HandleRegistry;
use spark_time::SharedClock;
use spark_types::{Handle, Principal, NANOS_PER_SECOND};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Issues and tracks credentials.
///
/// Consults the [`HandleRegistry`] for ownership at issuance time and reads
/// time from the registry's clock, so both components agree on "now".
pub struct CredentialAuthority {
    registry: Arc<HandleRegistry>,
    clock: SharedClock,
    policy: Arc<dyn DurationPolicy>,
    ids: Arc<dyn IdGenerator>,
    state: RwLock<CredentialState>,
}

#[derive(Debug, Default)]
struct CredentialState {
    /// Credential id → record
    credentials: HashMap<CredentialId, Credential>,
    /// Owner → credential ids in issuance order
    owner_to_credentials: HashMap<Principal, Vec<CredentialId>>,
    /// Handle → credential ids in issuance order
    handle_to_credentials: HashMap<Handle, Vec<CredentialId>>,
}

impl CredentialState {
    fn resolve<'a>(
        &'a self,
        ids: Option<&'a Vec<CredentialId>>,
    ) -> impl Iterator<Item = &'a Credential> + 'a {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.credentials.get(id))
    }
}

impl CredentialAuthority {
    pub fn new(registry: Arc<HandleRegistry>) -> Self {
        Self::with_config(registry, &CredentialConfig::default())
    }

    pub fn with_config(registry: Arc<HandleRegistry>, config: &CredentialConfig) -> Self {
        let clock = registry.clock();
        Self {
            registry,
            clock,
            policy: config.duration_policy(),
            ids: Arc::new(RandomIdGenerator),
            state: RwLock::new(CredentialState::default()),
        }
    }

    /// Replace the duration policy.
    pub fn with_policy(mut self, policy: Arc<dyn DurationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the id generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn registry(&self) -> &Arc<HandleRegistry> {
        &self.registry
    }

    /// Issue a credential for `handle` to its current owner.
    pub fn issue_credential(
        &self,
        handle: &str,
        scope: Vec<String>,
        requested_secs: i64,
        caller: Option<&Principal>,
    ) -> Result<Credential> {
        let caller = caller.ok_or(CredentialError::Unauthenticated)?;
        let handle = Handle::normalize(handle);
        let now = self.clock.now();

        let registration = self
            .registry
            .lookup_handle(handle.as_str())
            .map_err(|_| CredentialError::HandleNotFound {
                handle: handle.as_str().to_string(),
            })?;

        if !registration.is_owned_by(caller) {
            debug!(handle = %handle, caller = %caller, "issuance by non-owner");
            return Err(CredentialError::NotOwner {
                handle: handle.as_str().to_string(),
            });
        }

        if registration.is_expired_at(now) {
            debug!(handle = %handle, "issuance against lapsed handle");
            return Err(CredentialError::HandleExpired {
                handle: handle.as_str().to_string(),
            });
        }

        let lifetime_ns = self.policy.lifetime_ns(requested_secs)?;

        let mut state = self.state.write();
        let id = loop {
            let candidate = self.ids.next_id();
            if !state.credentials.contains_key(&candidate) {
                break candidate;
            }
            debug!(credential_id = %candidate, "credential id already taken, drawing again");
        };

        let credential = Credential {
            id: id.clone(),
            handle: registration.handle.clone(),
            owner: registration.owner.clone(),
            scope,
            issued_at: now,
            expires_at: now.saturating_add_nanos(lifetime_ns),
            active: true,
        };

        state.credentials.insert(id.clone(), credential.clone());
        state
            .owner_to_credentials
            .entry(credential.owner.clone())
            .or_default()
            .push(id.clone());
        state
            .handle_to_credentials
            .entry(credential.handle.clone())
            .or_default()
            .push(id);

        info!(
            credential_id = %credential.id,
            handle = %credential.handle,
            owner = %credential.owner,
            expires_at = credential.expires_at.as_nanos(),
            "credential issued"
        );
        Ok(credential)
    }

    /// Check a credential. Not found beats revoked, which beats expired.
    pub fn verify_credential(
        &self,
        id: &str,
    ) -> std::result::Result<VerifiedCredential, InvalidReason> {
        let now = self.clock.now();
        let state = self.state.read();
        let credential = state
            .credentials
            .get(&CredentialId::new(id))
            .ok_or(InvalidReason::NotFound)?;

        if !credential.active {
            return Err(InvalidReason::Revoked);
        }
        if credential.is_expired_at(now) {
            return Err(InvalidReason::Expired);
        }

        let remaining_time = credential.expires_at.saturating_nanos_since(now) / NANOS_PER_SECOND;
        Ok(VerifiedCredential {
            credential: credential.clone(),
            remaining_time,
        })
    }

    /// Revoke a credential, reporting why a refusal happened.
    ///
    /// Revoking a credential that is already inactive or expired succeeds.
    pub fn try_revoke_credential(
        &self,
        id: &str,
        caller: Option<&Principal>,
    ) -> std::result::Result<Credential, RevokeError> {
        let caller = caller.ok_or(RevokeError::Unauthenticated)?;
        let mut state = self.state.write();
        let credential = state
            .credentials
            .get_mut(&CredentialId::new(id))
            .ok_or_else(|| RevokeError::NotFound { id: id.to_string() })?;

        if &credential.owner != caller {
            return Err(RevokeError::NotOwner { id: id.to_string() });
        }

        credential.active = false;
        info!(credential_id = %credential.id, owner = %caller, "credential revoked");
        Ok(credential.clone())
    }

    /// Boolean form of [`Self::try_revoke_credential`].
    pub fn revoke_credential(&self, id: &str, caller: Option<&Principal>) -> bool {
        match self.try_revoke_credential(id, caller) {
            Ok(_) => true,
            Err(error) => {
                debug!(credential_id = id, reason = error.kind(), "revocation refused");
                false
            }
        }
    }

    /// Every credential issued to `owner`, whatever its state.
    pub fn credentials_by_owner(&self, owner: &Principal) -> Vec<Credential> {
        let state = self.state.read();
        state
            .resolve(state.owner_to_credentials.get(owner))
            .cloned()
            .collect()
    }

    /// Credentials under `handle` that have not been revoked. Expired ones
    /// are still listed.
    pub fn credentials_by_handle(&self, handle: &str) -> Vec<Credential> {
        let handle = Handle::normalize(handle);
        let state = self.state.read();
        state
            .resolve(state.handle_to_credentials.get(&handle))
            .filter(|credential| credential.active)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CredentialAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialAuthority")
            .field("policy", &self.policy)
            .field("ids", &self.ids)
            .field("credentials", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;
    use spark_time::ManualClock;
    use spark_types::{TimeNs, MAX_CREDENTIAL_NS, ONE_DAY_NS, ONE_YEAR_NS};

    struct Fixture {
        clock: Arc<ManualClock>,
        registry: Arc<HandleRegistry>,
        authority: CredentialAuthority,
        alice: Principal,
        bob: Principal,
    }

    fn fixture() -> Fixture {
        let clock = ManualClock::shared(TimeNs::ZERO);
        let registry = Arc::new(HandleRegistry::new(clock.clone()));
        let authority = CredentialAuthority::new(registry.clone())
            .with_id_generator(Arc::new(SequentialIdGenerator::new()));
        let alice = Principal::from_text("alice").unwrap();
        let bob = Principal::from_text("bob").unwrap();
        registry.register_handle("agent007", Some(&alice)).unwrap();
        Fixture {
            clock,
            registry,
            authority,
            alice,
            bob,
        }
    }

    fn scope(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_issue_credential() {
        let f = fixture();
        f.clock.advance_secs(10);
        let cred = f
            .authority
            .issue_credential("agent007", scope(&["read", "write"]), 86_400, Some(&f.alice))
            .unwrap();

        assert_eq!(cred.id.as_str(), "cred-0000000000000001");
        assert_eq!(cred.handle.as_str(), "@agent007");
        assert_eq!(cred.owner, f.alice);
        assert_eq!(cred.scope, vec!["read", "write"]);
        assert_eq!(cred.issued_at, TimeNs::from_secs(10));
        assert_eq!(cred.expires_at, TimeNs::from_secs(10 + 86_400));
        assert!(cred.active);
        assert_eq!(f.authority.len(), 1);
    }

    #[test]
    fn test_issue_error_precedence() {
        let f = fixture();
        assert_eq!(
            f.authority.issue_credential("missing", vec![], 60, None),
            Err(CredentialError::Unauthenticated)
        );
        assert!(matches!(
            f.authority.issue_credential("missing", vec![], 60, Some(&f.alice)),
            Err(CredentialError::HandleNotFound { .. })
        ));
        assert!(matches!(
            f.authority.issue_credential("agent007", vec![], 60, Some(&f.bob)),
            Err(CredentialError::NotOwner { .. })
        ));

        f.clock.set(TimeNs(ONE_YEAR_NS));
        // Owner check comes before the expiry check.
        assert!(matches!(
            f.authority.issue_credential("agent007", vec![], 60, Some(&f.bob)),
            Err(CredentialError::NotOwner { .. })
        ));
        assert!(matches!(
            f.authority.issue_credential("@agent007", vec![], 60, Some(&f.alice)),
            Err(CredentialError::HandleExpired { .. })
        ));
        assert!(f.authority.is_empty());
    }

    #[test]
    fn test_issue_clamps_duration() {
        let f = fixture();
        for requested in [0, -1, (MAX_CREDENTIAL_NS / NANOS_PER_SECOND) as i64 + 1] {
            let cred = f
                .authority
                .issue_credential("agent007", vec![], requested, Some(&f.alice))
                .unwrap();
            assert_eq!(
                cred.expires_at.as_nanos() - cred.issued_at.as_nanos(),
                ONE_DAY_NS
            );
        }
        let cred = f
            .authority
            .issue_credential("agent007", vec![], 1, Some(&f.alice))
            .unwrap();
        assert_eq!(cred.expires_at, TimeNs::from_secs(1));
    }

    #[test]
    fn test_verify_precedence_and_remaining_time() {
        let f = fixture();
        assert_eq!(
            f.authority.verify_credential("cred-nope"),
            Err(InvalidReason::NotFound)
        );

        let cred = f
            .authority
            .issue_credential("agent007", vec![], 100, Some(&f.alice))
            .unwrap();
        let verified = f.authority.verify_credential(cred.id.as_str()).unwrap();
        assert_eq!(verified.remaining_time, 100);
        assert_eq!(verified.credential, cred);

        f.clock.advance_nanos(500_000_000);
        let verified = f.authority.verify_credential(cred.id.as_str()).unwrap();
        assert_eq!(verified.remaining_time, 99);

        f.clock.set(TimeNs::from_secs(100));
        assert_eq!(
            f.authority.verify_credential(cred.id.as_str()),
            Err(InvalidReason::Expired)
        );

        assert!(f.authority.revoke_credential(cred.id.as_str(), Some(&f.alice)));
        assert_eq!(
            f.authority.verify_credential(cred.id.as_str()),
            Err(InvalidReason::Revoked)
        );
    }

    #[test]
    fn test_revoke_reasons() {
        let f = fixture();
        let cred = f
            .authority
            .issue_credential("agent007", vec![], 60, Some(&f.alice))
            .unwrap();
        let id = cred.id.as_str();

        assert_eq!(
            f.authority.try_revoke_credential(id, None),
            Err(RevokeError::Unauthenticated)
        );
        assert!(matches!(
            f.authority.try_revoke_credential("cred-missing", Some(&f.alice)),
            Err(RevokeError::NotFound { .. })
        ));
        assert!(matches!(
            f.authority.try_revoke_credential(id, Some(&f.bob)),
            Err(RevokeError::NotOwner { .. })
        ));
        assert!(!f.authority.revoke_credential(id, Some(&f.bob)));
        assert!(f.authority.verify_credential(id).is_ok());

        let revoked = f.authority.try_revoke_credential(id, Some(&f.alice)).unwrap();
        assert!(!revoked.active);
        // Revoking again is still reported as success.
        assert!(f.authority.revoke_credential(id, Some(&f.alice)));
    }

    #[test]
    fn test_listing_queries() {
        let f = fixture();
        f.registry.register_handle("side", Some(&f.alice)).unwrap();
        f.registry.register_handle("bobs", Some(&f.bob)).unwrap();

        let a = f
            .authority
            .issue_credential("agent007", scope(&["a"]), 60, Some(&f.alice))
            .unwrap();
        let b = f
            .authority
            .issue_credential("side", scope(&["b"]), 60, Some(&f.alice))
            .unwrap();
        let c = f
            .authority
            .issue_credential("agent007", scope(&["c"]), 60, Some(&f.alice))
            .unwrap();
        let d = f
            .authority
            .issue_credential("bobs", scope(&["d"]), 60, Some(&f.bob))
            .unwrap();

        assert!(f.authority.revoke_credential(c.id.as_str(), Some(&f.alice)));
        let c = f
            .authority
            .credentials_by_owner(&f.alice)
            .into_iter()
            .find(|cred| cred.id == c.id)
            .unwrap();

        assert_eq!(
            f.authority.credentials_by_owner(&f.alice),
            vec![a.clone(), b.clone(), c]
        );
        assert_eq!(f.authority.credentials_by_owner(&f.bob), vec![d]);
        assert_eq!(f.authority.credentials_by_handle("agent007"), vec![a.clone()]);
        assert_eq!(f.authority.credentials_by_handle("@agent007"), vec![a]);
        assert_eq!(f.authority.credentials_by_handle("side"), vec![b]);
        assert!(f.authority.credentials_by_handle("unknown").is_empty());
    }

    #[test]
    fn test_id_collisions_are_redrawn() {
        #[derive(Debug)]
        struct Repeating(std::sync::atomic::AtomicU64);

        impl IdGenerator for Repeating {
            fn next_id(&self) -> CredentialId {
                // Emits 1, 1, 2, 2, 3, 3, ...
                let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst) / 2 + 1;
                CredentialId::new(format!("cred-{n}"))
            }
        }

        let f = fixture();
        let authority = CredentialAuthority::new(f.registry.clone())
            .with_id_generator(Arc::new(Repeating(Default::default())));
        let first = authority
            .issue_credential("agent007", vec![], 60, Some(&f.alice))
            .unwrap();
        let second = authority
            .issue_credential("agent007", vec![], 60, Some(&f.alice))
            .unwrap();
        assert_eq!(first.id.as_str(), "cred-1");
        assert_eq!(second.id.as_str(), "cred-2");
        assert_eq!(authority.len(), 2);
    }

    #[test]
    fn test_credentials_survive_handle_takeover() {
        let f = fixture();
        let cred = f
            .authority
            .issue_credential("agent007", vec![], 60, Some(&f.alice))
            .unwrap();

        f.clock.set(TimeNs(ONE_YEAR_NS));
        f.registry.register_handle("agent007", Some(&f.bob)).unwrap();

        // Credential ownership is fixed at issuance.
        assert!(!f.authority.revoke_credential(cred.id.as_str(), Some(&f.bob)));
        assert!(f.authority.revoke_credential(cred.id.as_str(), Some(&f.alice)));
    }
}
