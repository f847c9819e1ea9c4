//! Replica audit results

use serde::Serialize;
use setu_core::{Fingerprint, RecordId, TierError, TierKind};

/// State of one tier's copy
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TierHealth {
    /// Bytes came back and hash to the recorded fingerprint
    Intact,
    /// Bytes came back but hash differently
    Corrupted {
        /// Fingerprint of what the tier returned
        actual: Fingerprint,
    },
    /// The tier could not return the bytes
    Unreachable {
        /// The tier's failure
        error: TierError,
    },
    /// The record holds no location for this tier
    NotReplicated,
}

/// One row of the audit
#[derive(Debug, Clone, Serialize)]
pub struct TierAudit {
    /// Which tier
    pub tier: TierKind,
    /// Locator recorded for it, if any
    pub locator: Option<String>,
    /// What the check found
    pub health: TierHealth,
}

/// Per-tier state of one record's copies
#[derive(Debug, Clone, Serialize)]
pub struct ReplicationAudit {
    /// Audited record
    pub record_id: RecordId,
    /// Fingerprint the copies were checked against
    pub fingerprint: Fingerprint,
    /// One row per tier, in priority order
    pub tiers: Vec<TierAudit>,
}

impl ReplicationAudit {
    /// Number of tiers whose copy is intact
    pub fn intact_count(&self) -> usize {
        self.tiers
            .iter()
            .filter(|t| matches!(t.health, TierHealth::Intact))
            .count()
    }

    /// At least one location is recorded
    pub fn is_durably_stored(&self) -> bool {
        self.tiers
            .iter()
            .any(|t| !matches!(t.health, TierHealth::NotReplicated))
    }

    /// Every tier has a recorded location
    pub fn is_fully_replicated(&self) -> bool {
        self.tiers
            .iter()
            .all(|t| !matches!(t.health, TierHealth::NotReplicated))
    }

    /// Every tier returned an intact copy
    pub fn is_fully_intact(&self) -> bool {
        self.tiers
            .iter()
            .all(|t| matches!(t.health, TierHealth::Intact))
    }
}
