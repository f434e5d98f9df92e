// Wall-clock source with a non-decreasing guarantee.
//
// A system clock stepped backwards (NTP correction, VM resume) must not make
// a live registration look expired and then live again, so the last emitted
// value is remembered and never undercut.

use parking_lot::Mutex;
use spark_types::TimeNs;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time in nanoseconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> TimeNs;
}

/// Clock handle shared between the registry and the credential authority.
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock that never moves backwards.
#[derive(Default)]
pub struct SystemClock {
    last_ns: Mutex<u64>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> TimeNs {
        let mut last = self.last_ns.lock();
        let candidate = system_time_ns();
        if candidate > *last {
            *last = candidate;
        }
        TimeNs(*last)
    }
}

impl fmt::Debug for SystemClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemClock")
            .field("last_ns", &*self.last_ns.lock())
            .finish()
    }
}

fn system_time_ns() -> u64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();
    u64::try_from(elapsed).unwrap_or(u64::MAX)
}
