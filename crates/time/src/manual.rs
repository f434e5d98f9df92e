//! Manually driven clock.

use crate::clock::Clock;
use spark_types::{TimeNs, NANOS_PER_SECOND};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Clock that only moves when told to. Used by tests and by the CLI script
/// runner to simulate expiry without waiting.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ns: AtomicU64,
}

impl ManualClock {
    pub fn new(start: TimeNs) -> Self {
        Self {
            now_ns: AtomicU64::new(start.as_nanos()),
        }
    }

    pub fn shared(start: TimeNs) -> Arc<Self> {
        Arc::new(Self::new(start))
    }

    /// Move the clock to `at`. Earlier values are ignored so readers never
    /// observe time going backwards.
    pub fn set(&self, at: TimeNs) {
        self.now_ns.fetch_max(at.as_nanos(), Ordering::SeqCst);
    }

    pub fn advance_nanos(&self, nanos: u64) -> TimeNs {
        let previous = self
            .now_ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(nanos))
            })
            .unwrap_or_else(|current| current);
        TimeNs(previous.saturating_add(nanos))
    }

    pub fn advance_secs(&self, secs: u64) -> TimeNs {
        self.advance_nanos(secs.saturating_mul(NANOS_PER_SECOND))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeNs {
        TimeNs(self.now_ns.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_types::ONE_DAY_NS;

    #[test]
    fn advances_only_on_request() {
        let clock = ManualClock::new(TimeNs::ZERO);
        assert_eq!(clock.now(), TimeNs::ZERO);
        assert_eq!(clock.now(), TimeNs::ZERO);

        assert_eq!(clock.advance_secs(86_400), TimeNs(ONE_DAY_NS));
        assert_eq!(clock.now(), TimeNs(ONE_DAY_NS));
    }

    #[test]
    fn set_never_rewinds() {
        let clock = ManualClock::new(TimeNs(500));
        clock.set(TimeNs(100));
        assert_eq!(clock.now(), TimeNs(500));
        clock.set(TimeNs(900));
        assert_eq!(clock.now(), TimeNs(900));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_advances_are_not_lost() {
        let clock = ManualClock::shared(TimeNs::ZERO);
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let clock = clock.clone();
                tokio::task::spawn_blocking(move || {
                    for _ in 0..100 {
                        clock.advance_nanos(1);
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(clock.now(), TimeNs(800));
    }
}
