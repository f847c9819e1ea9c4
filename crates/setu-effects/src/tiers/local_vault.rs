//! Local vault tier: sealed files under one directory
//!
//! Each file is sealed with the [`CipherVault`], base64 encoded and written
//! atomically as `{caseId}_{millis}_{fileName}.enc`. The locator is the
//! absolute path of that file. Name collisions get a numeric suffix rather
//! than overwriting an earlier file.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use setu_core::{
    config::LocalVaultConfig, CipherVault, EvidenceTier, SetuError, StoreRequest, TierError,
    TierKind, VaultKey,
};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::fs;
use crate::naming::{vault_file_name, SEALED_SUFFIX};

const KIND: TierKind = TierKind::LocalVault;

/// Sealed-file tier on the local filesystem
#[derive(Debug)]
pub struct LocalVaultTier {
    root: PathBuf,
    vault: CipherVault,
}

impl LocalVaultTier {
    /// Open (creating if needed) a vault directory
    pub fn new(root: impl AsRef<Path>, key: &VaultKey) -> Result<Self, SetuError> {
        let root = fs::prepare_dir(root.as_ref()).map_err(|e| {
            SetuError::config(format!(
                "Failed to prepare vault directory {}: {e}",
                root.as_ref().display()
            ))
        })?;
        info!("Initialized local vault at {:?}", root);
        Ok(Self {
            root,
            vault: CipherVault::new(key),
        })
    }

    /// Build from the `[local_vault]` section
    pub fn from_config(config: &LocalVaultConfig) -> Result<Self, SetuError> {
        Self::new(&config.root, &config.key()?)
    }

    /// Directory holding the sealed files
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidate(&self, file_name: &str, attempt: u32) -> PathBuf {
        if attempt == 0 {
            return self.root.join(file_name);
        }
        let stem = file_name.strip_suffix(SEALED_SUFFIX).unwrap_or(file_name);
        self.root.join(format!("{stem}-{attempt}{SEALED_SUFFIX}"))
    }

    /// Resolve a locator, refusing anything that points outside the root
    fn resolve(&self, locator: &str) -> Result<PathBuf, TierError> {
        let path = PathBuf::from(locator);
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir));
        if locator.is_empty() || escapes || !path.starts_with(&self.root) || path == self.root {
            return Err(TierError::read(
                KIND,
                format!("locator {locator:?} is outside the vault"),
            ));
        }
        Ok(path)
    }
}

#[async_trait]
impl EvidenceTier for LocalVaultTier {
    fn kind(&self) -> TierKind {
        KIND
    }

    async fn store(&self, request: StoreRequest<'_>) -> Result<String, TierError> {
        let sealed = self
            .vault
            .seal(request.bytes)
            .map_err(|e| TierError::write(KIND, e.to_string()))?;
        let encoded = BASE64.encode(sealed);

        let name = vault_file_name(request.case_id, request.ingested_at, request.file_name);
        let path = fs::write_new(|n| self.candidate(&name, n), encoded.as_bytes())
            .await
            .map_err(|e| TierError::write(KIND, format!("Failed to write vault file: {e}")))?;

        debug!(path = %path.display(), size = request.bytes.len(), "Sealed evidence into vault");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TierError> {
        let path = self.resolve(locator)?;

        let encoded = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                TierError::not_found(KIND, locator)
            } else {
                TierError::read(KIND, format!("Failed to read vault file: {e}"))
            }
        })?;

        let sealed = BASE64
            .decode(encoded.trim())
            .map_err(|e| TierError::read(KIND, format!("Vault file is not valid base64: {e}")))?;

        let bytes = self
            .vault
            .open(&sealed)
            .map_err(|source| TierError::Decryption { tier: KIND, source })?;

        debug!(path = %path.display(), size = bytes.len(), "Opened evidence from vault");
        Ok(bytes)
    }
}
