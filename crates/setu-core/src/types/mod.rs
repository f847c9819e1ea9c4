//! Evidence domain types

/// Record, case and officer identifiers
pub mod identifiers;
/// Catalog record, ledger reference and atomic updates
pub mod record;
/// Tier kinds and per-tier locations
pub mod tier;

pub use identifiers::{CaseId, OfficerId, RecordId};
pub use record::{EvidenceRecord, LedgerReference, RecordUpdate, UpdatePrecondition};
pub use tier::{TierKind, TierLocations};
