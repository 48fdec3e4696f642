//! # Time Sources
//!
//! Anything in the core that needs "now" takes a [`Clock`] instead of
//! reading the wall clock itself. The signer uses it to stamp payloads that
//! arrive without a timestamp, the key-file reader uses it for files that
//! never recorded one, and the rate cache uses it to decide when its entry
//! has gone stale.
//!
//! All clocks report microseconds since the Unix epoch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;

/// A source of the current time in microseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current time, in microseconds.
    fn now_micros(&self) -> u64;

    /// Current time in milliseconds. Derived from [`now_micros`](Self::now_micros).
    fn now_millis(&self) -> u64 {
        self.now_micros() / 1_000
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}

/// Wall-clock time.
///
/// Resolution is one millisecond scaled to microseconds, which is what the
/// broadcast endpoint has always received from browser clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        millis * 1_000
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_micros(&self) -> u64 {
        self.0
    }
}

/// A clock that only moves when told to. Shared by reference across threads.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    /// Starts the clock at `micros`.
    pub fn new(micros: u64) -> Self {
        Self {
            micros: AtomicU64::new(micros),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.micros
            .fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }

    /// Jumps to an absolute instant.
    pub fn set(&self, micros: u64) {
        self.micros.store(micros, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u64 {
        self.micros.load(Ordering::SeqCst)
    }
}
