//! # Setu Effects - Layer 2: Handlers
//!
//! Concrete implementations of the effect interfaces declared in `setu-core`:
//!
//! - **Tiers**: the pinning-service content network, an HTTP object store and
//!   the sealed local vault ([`EvidenceTier`](setu_core::EvidenceTier))
//! - **Catalogs**: in-memory and one-file-per-record on disk
//!   ([`CatalogEffects`](setu_core::CatalogEffects))
//! - **Clock**: [`SystemClock`]
//!
//! Handlers are stateless beyond their own connection or directory; all
//! multi-tier coordination lives in `setu-store`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Record catalog handlers
pub mod catalog;
/// Object key and vault file naming
pub mod naming;
/// Tier adapters
pub mod tiers;
/// System clock
pub mod time;

mod fs;

pub use catalog::{FilesystemCatalog, MemoryCatalog};
pub use tiers::{tiers_from_config, BucketObjectTier, LocalVaultTier, PinningGatewayTier};
pub use time::SystemClock;
