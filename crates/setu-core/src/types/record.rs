//! The catalog entry for one submitted evidence file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::identifiers::{CaseId, OfficerId, RecordId};
use super::tier::TierLocations;
use crate::crypto::Fingerprint;

/// Anchoring state of a record's fingerprint
///
/// Serialized as a bare string: the pending sentinel or the opaque reference
/// handed back by the anchoring service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LedgerReference {
    /// Not yet confirmed by the anchoring service
    #[default]
    Pending,
    /// Confirmed anchoring transaction
    Confirmed(String),
}

impl LedgerReference {
    /// Wire form of the pending state
    pub const PENDING_SENTINEL: &'static str = "PENDING_SIGNATURE";

    /// Whether the anchor is still awaiting confirmation
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The confirmed reference, if any
    pub fn confirmed(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Confirmed(reference) => Some(reference),
        }
    }
}

impl From<String> for LedgerReference {
    fn from(value: String) -> Self {
        if value.is_empty() || value == Self::PENDING_SENTINEL {
            Self::Pending
        } else {
            Self::Confirmed(value)
        }
    }
}

impl From<LedgerReference> for String {
    fn from(reference: LedgerReference) -> Self {
        match reference {
            LedgerReference::Pending => LedgerReference::PENDING_SENTINEL.to_string(),
            LedgerReference::Confirmed(value) => value,
        }
    }
}

impl fmt::Display for LedgerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str(Self::PENDING_SENTINEL),
            Self::Confirmed(value) => f.write_str(value),
        }
    }
}

/// Catalog entry for one evidence file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Catalog key
    pub id: RecordId,
    /// Matter this item belongs to
    pub case_id: CaseId,
    /// Submitting officer
    pub officer_id: OfficerId,
    /// Original file name
    pub file_name: String,
    /// Original content type
    pub media_type: String,
    /// Length of the original bytes
    pub size_bytes: u64,
    /// Digest of the original bytes, fixed at ingestion
    pub fingerprint: Fingerprint,
    /// Locator per tier that accepted the bytes
    pub tier_locations: TierLocations,
    /// Anchoring state
    #[serde(default)]
    pub ledger_reference: LedgerReference,
    /// Ingestion time
    pub created_at: DateTime<Utc>,
}

impl EvidenceRecord {
    /// Durably stored: at least one tier holds a copy
    pub fn is_durably_stored(&self) -> bool {
        self.tier_locations.is_durably_stored()
    }

    /// Fully replicated: every tier holds a copy
    pub fn is_fully_replicated(&self) -> bool {
        self.tier_locations.is_fully_replicated()
    }
}

/// Guard evaluated inside the catalog's atomic update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdatePrecondition {
    /// Apply only while the ledger reference is still pending
    LedgerPending,
}

/// Partial update applied to a record as one atomic step
///
/// Fingerprint, identity and timestamp are not updatable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    /// Replace the tier locations
    pub tier_locations: Option<TierLocations>,
    /// Replace the ledger reference
    pub ledger_reference: Option<LedgerReference>,
    /// Reject the update unless this holds for the stored record
    pub precondition: Option<UpdatePrecondition>,
}

impl RecordUpdate {
    /// Update that sets the ledger reference
    pub fn ledger(reference: LedgerReference) -> Self {
        Self {
            ledger_reference: Some(reference),
            ..Self::default()
        }
    }

    /// Require `precondition` on the stored record
    pub fn when(mut self, precondition: UpdatePrecondition) -> Self {
        self.precondition = Some(precondition);
        self
    }

    /// Whether `record` satisfies this update's precondition
    pub fn admits(&self, record: &EvidenceRecord) -> bool {
        match self.precondition {
            None => true,
            Some(UpdatePrecondition::LedgerPending) => record.ledger_reference.is_pending(),
        }
    }

    /// Apply the fields to `record`; callers check [`RecordUpdate::admits`] first
    pub fn apply(&self, record: &mut EvidenceRecord) {
        if let Some(locations) = &self.tier_locations {
            record.tier_locations = locations.clone();
        }
        if let Some(reference) = &self.ledger_reference {
            record.ledger_reference = reference.clone();
        }
    }
}
