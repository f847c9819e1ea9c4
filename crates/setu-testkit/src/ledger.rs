//! In-memory anchoring ledger

use async_trait::async_trait;
use setu_core::{AnchorLedgerEffects, Fingerprint, Result, SetuError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Ledger double mapping references to the fingerprint they anchor
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    entries: Arc<RwLock<HashMap<String, Fingerprint>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `reference` anchors `fingerprint`
    pub fn anchor(&self, reference: impl Into<String>, fingerprint: Fingerprint) {
        self.entries
            .write()
            .unwrap()
            .insert(reference.into(), fingerprint);
    }

    /// Make every lookup fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnchorLedgerEffects for MemoryLedger {
    async fn anchored_fingerprint(&self, reference: &str) -> Result<Option<Fingerprint>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SetuError::network("ledger unavailable"));
        }
        Ok(self.entries.read().unwrap().get(reference).copied())
    }
}
