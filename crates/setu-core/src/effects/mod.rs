//! Effect interfaces the store consumes
//!
//! Pure signatures only. Handlers live in `setu-effects`; fault-injecting
//! doubles live in `setu-testkit`.

/// Record catalog collaborator
pub mod catalog;
/// Anchoring service lookups
pub mod ledger;
/// Per-tier put/get capability
pub mod tier;
/// Wall-clock time
pub mod time;

pub use catalog::CatalogEffects;
pub use ledger::AnchorLedgerEffects;
pub use tier::{EvidenceTier, StoreRequest};
pub use time::PhysicalTimeEffects;
