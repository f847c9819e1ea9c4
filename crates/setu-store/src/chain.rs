//! Ordered fallback chain over the configured tiers

use setu_core::{EvidenceTier, SetuError, TierKind};
use std::fmt;
use std::sync::Arc;

/// Tiers sorted by priority, at most one per kind
///
/// Writes visit every tier in this order; reads stop at the first success.
#[derive(Clone)]
pub struct TierChain {
    tiers: Vec<Arc<dyn EvidenceTier>>,
}

impl TierChain {
    /// Sort `tiers` by priority; rejects an empty set and duplicate kinds
    pub fn new(mut tiers: Vec<Arc<dyn EvidenceTier>>) -> Result<Self, SetuError> {
        if tiers.is_empty() {
            return Err(SetuError::config("at least one evidence tier is required"));
        }
        tiers.sort_by_key(|t| t.kind().priority());
        if let Some(pair) = tiers.windows(2).find(|w| w[0].kind() == w[1].kind()) {
            return Err(SetuError::config(format!(
                "tier {} configured more than once",
                pair[0].kind()
            )));
        }
        Ok(Self { tiers })
    }

    /// Tiers in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn EvidenceTier>> {
        self.tiers.iter()
    }

    /// The tier of a given kind, if configured
    pub fn get(&self, kind: TierKind) -> Option<&Arc<dyn EvidenceTier>> {
        self.tiers.iter().find(|t| t.kind() == kind)
    }

    /// Configured kinds in priority order
    pub fn kinds(&self) -> Vec<TierKind> {
        self.tiers.iter().map(|t| t.kind()).collect()
    }

    /// Number of configured tiers
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether no tiers are configured
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl fmt::Debug for TierChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
