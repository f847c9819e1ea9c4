//! Wall-clock time

use chrono::{DateTime, Utc};

/// Source of ingestion timestamps
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}
