//! Time sources for usage accounting.
//!
//! The scheduler only ever asks for "now" as a millisecond reading. Readings
//! must be non-decreasing for the lifetime of a scheduler; the absolute
//! origin is irrelevant as long as it is consistent.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic millisecond time source.
pub trait Clock: Send + Sync + 'static {
    /// Current reading in milliseconds.
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Production clock backed by [`Instant`], reporting milliseconds since the
/// clock was constructed.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1_000.0
    }
}

/// Hand-driven clock for deterministic tests and simulations.
///
/// Clones share the same reading, so a test can keep one handle while the
/// scheduler owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock whose first reading is `millis`.
    pub fn starting_at(millis: f64) -> Self {
        let clock = Self::new();
        clock.set(millis);
        clock
    }

    /// Overwrite the current reading.
    pub fn set(&self, millis: f64) {
        self.millis.store(millis.to_bits(), Ordering::SeqCst);
    }

    /// Move the clock forward by `millis`.
    pub fn advance_millis(&self, millis: f64) {
        let _ = self
            .millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                Some((f64::from_bits(bits) + millis).to_bits())
            });
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.advance_millis(duration.as_secs_f64() * 1_000.0);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.millis.load(Ordering::SeqCst))
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("millis", &self.now())
            .finish()
    }
}
