//! Deterministic clocks

use chrono::{DateTime, Duration, TimeZone, Utc};
use setu_core::PhysicalTimeEffects;
use std::sync::atomic::{AtomicI64, Ordering};

/// 2026-01-01T00:00:00Z, the default start for test clocks
pub fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(test_epoch())
    }
}

impl PhysicalTimeEffects for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Advances by a fixed step on every reading
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    step: Duration,
    ticks: AtomicI64,
}

impl SteppingClock {
    /// Start at `start`, moving `step` per call to `now`
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            step,
            ticks: AtomicI64::new(0),
        }
    }

    /// Number of readings taken
    pub fn readings(&self) -> i64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new(test_epoch(), Duration::milliseconds(1))
    }
}

impl PhysicalTimeEffects for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + self.step * i32::try_from(tick).unwrap_or(i32::MAX)
    }
}
