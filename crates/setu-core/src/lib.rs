//! # Setu Core - Layer 1: Foundation
//!
//! **Purpose**: Evidence domain types, content fingerprints, local sealing and
//! the effect interfaces the store is written against.
//!
//! # Architecture Constraints
//!
//! - YES Evidence records, tier locations, ledger references
//! - YES Pure functions: fingerprinting, sealing, configuration validation
//! - YES Effect traits (`EvidenceTier`, `CatalogEffects`, ...)
//! - NO effect handler implementations (see `setu-effects`)
//! - NO orchestration (see `setu-store`)
//!
//! ## Core Concepts
//!
//! - **Fingerprint**: SHA-256 of the original bytes, computed once at ingestion
//! - **Sealed blob**: nonce-prefixed AES-256-GCM ciphertext for the local vault
//! - **Tier**: one of three independent backends holding a copy of each file

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Store configuration
pub mod config;
/// Fingerprinting and sealing
pub mod crypto;
/// Effect interfaces
pub mod effects;
/// Error types
pub mod errors;
/// Domain types
pub mod types;

pub use config::{AnchorPolicy, SecretString, SetuConfig};
pub use crypto::{fingerprint, CipherVault, Fingerprint, VaultKey};
pub use effects::{
    AnchorLedgerEffects, CatalogEffects, EvidenceTier, PhysicalTimeEffects, StoreRequest,
};
pub use errors::{DecryptionError, Result, SetuError, TierError, TierOperation};
pub use types::{
    CaseId, EvidenceRecord, LedgerReference, OfficerId, RecordId, RecordUpdate, TierKind,
    TierLocations, UpdatePrecondition,
};
