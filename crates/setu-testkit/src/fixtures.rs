//! Ready-made wiring for store tests

use chrono::Duration;
use setu_core::{CaseId, CatalogEffects, EvidenceTier, OfficerId, TierKind, VaultKey};
use setu_effects::{LocalVaultTier, MemoryCatalog};
use std::sync::Arc;
use tempfile::TempDir;

use crate::clock::{test_epoch, SteppingClock};
use crate::ledger::MemoryLedger;
use crate::tiers::MemoryTier;

/// Case id used throughout the tests
pub fn test_case_id() -> CaseId {
    CaseId::new("NYA-2026-001").unwrap()
}

/// Officer id used throughout the tests
pub fn test_officer_id() -> OfficerId {
    OfficerId::new("OFF-4471").unwrap()
}

/// Deterministic pseudo-random bytes
pub fn evidence_bytes(seed: u8, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

/// Three healthy memory tiers, a memory catalog, a stepping clock and a ledger
///
/// Each tier handle shares state with the copy returned by [`TestHarness::tiers`],
/// so faults can be injected after the store is built.
#[derive(Debug)]
pub struct TestHarness {
    /// Content-network double
    pub content: MemoryTier,
    /// Durable-object double
    pub durable: MemoryTier,
    /// Local-vault double
    pub vault: MemoryTier,
    /// Shared catalog
    pub catalog: MemoryCatalog,
    /// Clock handing out 1 ms steps
    pub clock: Arc<SteppingClock>,
    /// Anchoring ledger
    pub ledger: MemoryLedger,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Fresh harness
    pub fn new() -> Self {
        Self {
            content: MemoryTier::new(TierKind::ContentNetwork),
            durable: MemoryTier::new(TierKind::DurableObject),
            vault: MemoryTier::new(TierKind::LocalVault),
            catalog: MemoryCatalog::new(),
            clock: Arc::new(SteppingClock::new(test_epoch(), Duration::milliseconds(1))),
            ledger: MemoryLedger::new(),
        }
    }

    /// All three tiers in priority order
    pub fn tiers(&self) -> Vec<Arc<dyn EvidenceTier>> {
        vec![
            Arc::new(self.content.clone()),
            Arc::new(self.durable.clone()),
            Arc::new(self.vault.clone()),
        ]
    }

    /// The tier double for `kind`
    pub fn tier(&self, kind: TierKind) -> &MemoryTier {
        match kind {
            TierKind::ContentNetwork => &self.content,
            TierKind::DurableObject => &self.durable,
            TierKind::LocalVault => &self.vault,
        }
    }

    /// Catalog as the trait object the store consumes
    pub fn catalog(&self) -> Arc<dyn CatalogEffects> {
        Arc::new(self.catalog.clone())
    }
}

/// A real sealed vault in a temporary directory
#[derive(Debug)]
pub struct TempVault {
    /// Keeps the directory alive
    pub dir: TempDir,
    /// Key the vault seals with
    pub key: VaultKey,
    /// The tier itself
    pub tier: Arc<LocalVaultTier>,
}

impl TempVault {
    /// Vault under a fresh temporary directory with a random key
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let key = VaultKey::generate();
        let tier = Arc::new(LocalVaultTier::new(dir.path().join("vault"), &key).unwrap());
        Self { dir, key, tier }
    }
}

impl Default for TempVault {
    fn default() -> Self {
        Self::new()
    }
}
