//! Storage tiers and the locations a record holds in each of them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SetuError;

/// One of the three independent storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TierKind {
    /// Content-addressed network tier reached through a gateway
    ContentNetwork,
    /// Bucket-style durable object store
    DurableObject,
    /// Sealed files on local disk, the tier of last resort
    LocalVault,
}

impl TierKind {
    /// Retrieval priority, highest first
    pub const PRIORITY: [TierKind; 3] = [
        TierKind::ContentNetwork,
        TierKind::DurableObject,
        TierKind::LocalVault,
    ];

    /// Stable name used in logs, configuration and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentNetwork => "content-network",
            Self::DurableObject => "durable-object",
            Self::LocalVault => "local-vault",
        }
    }

    /// Position in [`TierKind::PRIORITY`]
    pub fn priority(&self) -> usize {
        match self {
            Self::ContentNetwork => 0,
            Self::DurableObject => 1,
            Self::LocalVault => 2,
        }
    }

    /// Whether calls to this tier leave the process and need a timeout
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::LocalVault)
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierKind {
    type Err = SetuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content-network" => Ok(Self::ContentNetwork),
            "durable-object" => Ok(Self::DurableObject),
            "local-vault" => Ok(Self::LocalVault),
            other => Err(SetuError::invalid(format!("unknown tier '{other}'"))),
        }
    }
}

/// Where a record's bytes live, one optional locator per tier
///
/// A location is absent when that tier's write failed during ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLocations {
    /// Content identifier on the network tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_address: Option<String>,
    /// Object key in the durable bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
    /// Path of the sealed file in the local vault
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_path: Option<String>,
}

impl TierLocations {
    /// Locator recorded for `tier`, if its write succeeded
    pub fn get(&self, tier: TierKind) -> Option<&str> {
        match tier {
            TierKind::ContentNetwork => self.content_address.as_deref(),
            TierKind::DurableObject => self.object_key.as_deref(),
            TierKind::LocalVault => self.vault_path.as_deref(),
        }
    }

    /// Record the locator returned by `tier`
    pub fn set(&mut self, tier: TierKind, locator: impl Into<String>) {
        let locator = Some(locator.into());
        match tier {
            TierKind::ContentNetwork => self.content_address = locator,
            TierKind::DurableObject => self.object_key = locator,
            TierKind::LocalVault => self.vault_path = locator,
        }
    }

    /// Tiers holding a copy, in retrieval priority order
    pub fn present(&self) -> Vec<TierKind> {
        TierKind::PRIORITY
            .into_iter()
            .filter(|tier| self.get(*tier).is_some())
            .collect()
    }

    /// Number of tiers holding a copy
    pub fn count(&self) -> usize {
        self.present().len()
    }

    /// No tier holds a copy
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// At least one tier holds a copy
    pub fn is_durably_stored(&self) -> bool {
        !self.is_empty()
    }

    /// Every tier holds a copy
    pub fn is_fully_replicated(&self) -> bool {
        self.count() == TierKind::PRIORITY.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let mut tiers = vec![
            TierKind::LocalVault,
            TierKind::ContentNetwork,
            TierKind::DurableObject,
        ];
        tiers.sort_by_key(TierKind::priority);
        assert_eq!(tiers, TierKind::PRIORITY.to_vec());
        assert!(TierKind::ContentNetwork.is_remote());
        assert!(!TierKind::LocalVault.is_remote());
    }

    #[test]
    fn test_tier_kind_parses_its_own_name() {
        for tier in TierKind::PRIORITY {
            assert_eq!(tier.as_str().parse::<TierKind>().unwrap(), tier);
        }
        assert!("tape".parse::<TierKind>().is_err());
    }

    #[test]
    fn test_replication_levels() {
        let mut locations = TierLocations::default();
        assert!(!locations.is_durably_stored());

        locations.set(TierKind::LocalVault, "/vault/C-1_1_a.enc");
        assert!(locations.is_durably_stored());
        assert!(!locations.is_fully_replicated());
        assert_eq!(locations.present(), vec![TierKind::LocalVault]);

        locations.set(TierKind::ContentNetwork, "bafy");
        locations.set(TierKind::DurableObject, "C-1/1_a");
        assert!(locations.is_fully_replicated());
        assert_eq!(locations.present(), TierKind::PRIORITY.to_vec());
    }

    #[test]
    fn test_absent_locations_are_not_serialized() {
        let mut locations = TierLocations::default();
        locations.set(TierKind::DurableObject, "C-1/1_a");
        let json = serde_json::to_string(&locations).unwrap();
        assert_eq!(json, r#"{"object_key":"C-1/1_a"}"#);
    }
}
