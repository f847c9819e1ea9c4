//! System clock handler

use chrono::{DateTime, Utc};
use setu_core::PhysicalTimeEffects;

/// Wall clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl PhysicalTimeEffects for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
