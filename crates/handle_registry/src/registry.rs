//! Handle registry implementation
//!
//! Records and the per-owner index sit behind a single lock, so the
//! "check availability, then insert" sequence of a registration and the
//! "check ownership, then extend" sequence of a renewal are atomic.

use crate::errors::*;
use crate::types::*;
use parking_lot::RwLock;
use spark_time::SharedClock;
use spark_types::{Amount, Handle, Principal};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// In-memory handle registry.
pub struct HandleRegistry {
    config: RegistryConfig,
    clock: SharedClock,
    state: RwLock<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Handle → registration record
    handles: HashMap<Handle, HandleRegistration>,
    /// Owner → handles in the order they were registered to that owner
    owner_to_handles: HashMap<Principal, Vec<Handle>>,
}

impl RegistryState {
    fn move_to_owner(&mut self, handle: &Handle, previous: Option<Principal>, owner: &Principal) {
        if previous.as_ref() == Some(owner) {
            return;
        }
        if let Some(previous) = previous {
            if let Some(list) = self.owner_to_handles.get_mut(&previous) {
                list.retain(|h| h != handle);
                if list.is_empty() {
                    self.owner_to_handles.remove(&previous);
                }
            }
        }
        self.owner_to_handles
            .entry(owner.clone())
            .or_default()
            .push(handle.clone());
    }
}

impl HandleRegistry {
    pub fn new(clock: SharedClock) -> Self {
        Self::with_config(RegistryConfig::default(), clock)
    }

    pub fn with_config(config: RegistryConfig, clock: SharedClock) -> Self {
        Self {
            config,
            clock,
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The clock every expiry decision in this registry is made against.
    pub fn clock(&self) -> SharedClock {
        self.clock.clone()
    }

    /// Fixed registration fee.
    pub fn registration_fee(&self) -> Amount {
        self.config.registration_fee
    }

    /// True when nobody holds a live registration for the handle.
    pub fn is_handle_available(&self, handle: &str) -> bool {
        let handle = Handle::normalize(handle);
        let now = self.clock.now();
        let state = self.state.read();
        state
            .handles
            .get(&handle)
            .map_or(true, |existing| existing.is_expired_at(now))
    }

    /// Register a handle to `caller`, replacing any lapsed registration.
    pub fn register_handle(
        &self,
        handle: &str,
        caller: Option<&Principal>,
    ) -> Result<HandleRegistration> {
        let owner = caller.ok_or(HandleRegistryError::Unauthenticated)?;
        let parsed = Handle::parse(handle).map_err(|source| {
            debug!(handle, reason = %source, "rejecting malformed handle");
            HandleRegistryError::InvalidFormat {
                handle: handle.to_string(),
                source,
            }
        })?;

        let now = self.clock.now();
        let mut state = self.state.write();

        if let Some(existing) = state.handles.get(&parsed) {
            if existing.is_live_at(now) {
                debug!(
                    handle = %parsed,
                    holder = %existing.owner,
                    "handle still registered"
                );
                return Err(HandleRegistryError::AlreadyRegistered {
                    handle: parsed.as_str().to_string(),
                });
            }
        }

        let registration = HandleRegistration {
            handle: parsed.clone(),
            owner: owner.clone(),
            registered_at: now,
            expires_at: now.saturating_add_nanos(self.config.registration_period_ns),
            renewed: 0,
        };

        let previous_owner = state
            .handles
            .insert(parsed.clone(), registration.clone())
            .map(|previous| previous.owner);
        let reclaimed = previous_owner.is_some();
        state.move_to_owner(&parsed, previous_owner, owner);

        info!(
            handle = %parsed,
            owner = %owner,
            expires_at = registration.expires_at.as_nanos(),
            reclaimed,
            "handle registered"
        );
        Ok(registration)
    }

    /// Extend a registration by one period from `max(now, expires_at)`.
    pub fn renew_handle(
        &self,
        handle: &str,
        caller: Option<&Principal>,
    ) -> Result<HandleRegistration> {
        let caller = caller.ok_or(HandleRegistryError::Unauthenticated)?;
        let handle = Handle::normalize(handle);
        let now = self.clock.now();
        let mut state = self.state.write();

        let record =
            state
                .handles
                .get_mut(&handle)
                .ok_or_else(|| HandleRegistryError::NotFound {
                    handle: handle.as_str().to_string(),
                })?;

        // Ownership is checked regardless of expiry.
        if !record.is_owned_by(caller) {
            debug!(handle = %handle, caller = %caller, "renewal by non-owner");
            return Err(HandleRegistryError::NotOwner {
                handle: handle.as_str().to_string(),
            });
        }

        if record.is_expired_at(now) && self.config.expired_renewal == ExpiredRenewal::Reject {
            debug!(handle = %handle, "renewal of lapsed registration rejected");
            return Err(HandleRegistryError::HandleExpired {
                handle: handle.as_str().to_string(),
            });
        }

        let base = now.max(record.expires_at);
        record.expires_at = base.saturating_add_nanos(self.config.registration_period_ns);
        record.renewed = record.renewed.saturating_add(1);

        info!(
            handle = %handle,
            owner = %caller,
            expires_at = record.expires_at.as_nanos(),
            renewed = record.renewed,
            "handle renewed"
        );
        Ok(record.clone())
    }

    /// Fetch a registration, expired or not.
    pub fn lookup_handle(&self, handle: &str) -> Result<HandleRegistration> {
        let handle = Handle::normalize(handle);
        let state = self.state.read();
        state
            .handles
            .get(&handle)
            .cloned()
            .ok_or_else(|| HandleRegistryError::NotFound {
                handle: handle.as_str().to_string(),
            })
    }

    /// All registrations, live or expired, currently recorded for `owner`.
    pub fn handles_by_owner(&self, owner: &Principal) -> Vec<HandleRegistration> {
        let state = self.state.read();
        state
            .owner_to_handles
            .get(owner)
            .map(|handles| {
                handles
                    .iter()
                    .filter_map(|handle| state.handles.get(handle).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of stored records, including lapsed ones.
    pub fn len(&self) -> usize {
        self.state.read().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("config", &self.config)
            .field("records", &self.len())
            .finish()
    }
}
