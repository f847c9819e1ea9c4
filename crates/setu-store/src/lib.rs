//! # Setu Store - Layer 3: Orchestration
//!
//! Redundant multi-tier evidence storage:
//!
//! - **Ingestion** writes every file to the content network, the durable
//!   object store and the local vault, then catalogs whichever locations
//!   succeeded. Only a file that no tier accepts fails.
//! - **Retrieval** tries tiers strictly in priority order and returns the
//!   first copy that comes back intact.
//! - **Verification** recomputes a candidate's fingerprint and compares it to
//!   the catalog and, optionally, the anchoring ledger.
//! - **Audit** checks every replica of one record.
//!
//! Tier failures are absorbed; only terminal outcomes surface as
//! [`EvidenceError`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Replica audit results
pub mod audit;
/// Tier fallback chain
pub mod chain;
/// Store errors
pub mod error;
/// Ingestion inputs and outcomes
pub mod ingest;
/// The orchestrator
pub mod store;
/// Fingerprint verification
pub mod verification;

pub use audit::{ReplicationAudit, TierAudit, TierHealth};
pub use chain::TierChain;
pub use error::EvidenceError;
pub use ingest::{EvidenceUpload, IngestFailure, IngestReport, IngestedEvidence};
pub use store::{AnchorOutcome, EvidenceStore, RetrievedEvidence, StoreOptions};
pub use verification::{
    AnchorCheck, RecordLookup, VerificationCandidate, VerificationEngine, VerificationOutcome,
    VerificationResult,
};
