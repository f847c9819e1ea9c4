//! Tier adapters

mod content_network;
mod durable_object;
mod http;
mod local_vault;

pub use content_network::PinningGatewayTier;
pub use durable_object::BucketObjectTier;
pub use local_vault::LocalVaultTier;

use setu_core::{EvidenceTier, SetuConfig, SetuError, TierKind};
use std::sync::Arc;
use tracing::info;

/// Build every enabled tier, highest priority first
pub fn tiers_from_config(config: &SetuConfig) -> Result<Vec<Arc<dyn EvidenceTier>>, SetuError> {
    let mut tiers: Vec<Arc<dyn EvidenceTier>> = Vec::new();
    for kind in TierKind::PRIORITY {
        let tier: Arc<dyn EvidenceTier> = match kind {
            TierKind::ContentNetwork if config.content_network.enabled => {
                Arc::new(PinningGatewayTier::from_config(&config.content_network)?)
            }
            TierKind::DurableObject if config.durable_object.enabled => {
                Arc::new(BucketObjectTier::from_config(&config.durable_object)?)
            }
            TierKind::LocalVault if config.local_vault.enabled => {
                Arc::new(LocalVaultTier::from_config(&config.local_vault)?)
            }
            _ => continue,
        };
        tiers.push(tier);
    }
    info!(
        tiers = ?tiers.iter().map(|t| t.kind()).collect::<Vec<_>>(),
        "Configured evidence tiers"
    );
    Ok(tiers)
}
