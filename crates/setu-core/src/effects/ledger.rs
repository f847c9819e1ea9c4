//! Read side of the external anchoring service

use async_trait::async_trait;

use crate::crypto::Fingerprint;
use crate::errors::Result;

/// Lookups against the anchoring ledger
///
/// Producing anchors is outside the store; it only needs to read back which
/// fingerprint a confirmed reference attests to.
#[async_trait]
pub trait AnchorLedgerEffects: Send + Sync {
    /// Fingerprint anchored by `reference`, or `None` if the ledger has no such entry
    async fn anchored_fingerprint(&self, reference: &str) -> Result<Option<Fingerprint>>;
}
