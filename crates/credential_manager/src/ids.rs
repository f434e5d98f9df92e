//! Credential id generation.

use crate::types::{CredentialId, CREDENTIAL_ID_PREFIX};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of candidate credential ids. The authority rejects candidates that
/// are already in use and draws again, so generators only need to be
/// collision-resistant, not collision-free.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn next_id(&self) -> CredentialId;
}

/// `cred-` followed by 64 bits of OS randomness in hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> CredentialId {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        CredentialId::new(format!("{CREDENTIAL_ID_PREFIX}{}", hex::encode(bytes)))
    }
}

/// Deterministic ids (`cred-0000000000000001`, ...) for tests and scripted runs.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> CredentialId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        CredentialId::new(format!("{CREDENTIAL_ID_PREFIX}{n:016x}"))
    }
}

/// Hands out a fixed list of ids first, then defers to another generator.
/// Used to give seeded demo credentials well-known ids.
pub struct PrefilledIdGenerator {
    queue: Mutex<VecDeque<CredentialId>>,
    fallback: Arc<dyn IdGenerator>,
}

impl PrefilledIdGenerator {
    pub fn new(ids: impl IntoIterator<Item = CredentialId>, fallback: Arc<dyn IdGenerator>) -> Self {
        Self {
            queue: Mutex::new(ids.into_iter().collect()),
            fallback,
        }
    }
}

impl IdGenerator for PrefilledIdGenerator {
    fn next_id(&self) -> CredentialId {
        if let Some(id) = self.queue.lock().pop_front() {
            return id;
        }
        self.fallback.next_id()
    }
}

impl fmt::Debug for PrefilledIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefilledIdGenerator")
            .field("queued", &self.queue.lock().len())
            .field("fallback", &self.fallback)
            .finish()
    }
}
