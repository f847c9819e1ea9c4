//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use setu_core::{SetuConfig, VaultKey};
use setu_store::EvidenceStore;
use std::path::Path;
use tracing::debug;

/// Load the file (defaults if absent) and apply environment overrides
pub fn load_config(path: &Path) -> Result<SetuConfig> {
    let mut config = SetuConfig::load_or_default(path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.merge_with_env()?;
    debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Validated store for `config`
pub fn open_store(config: &SetuConfig) -> Result<EvidenceStore> {
    EvidenceStore::from_config(config).context("opening evidence store")
}

/// Write a starter configuration with a fresh vault key
///
/// Refuses to overwrite an existing file.
pub fn write_starter_config(path: &Path) -> Result<SetuConfig> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let mut config = SetuConfig::default();
    config.local_vault.key_hex = Some(VaultKey::generate().to_hex().into());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, config.to_toml()?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(config)
}
