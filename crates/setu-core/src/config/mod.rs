//! Store configuration
//!
//! One explicit struct, loaded from TOML and overridden from `SETU_*`
//! environment variables, then injected into each tier adapter and the vault
//! at construction time.
//!
//! ```toml
//! [content_network]
//! api_url = "https://api.pinata.cloud"
//! gateway_url = "https://gateway.pinata.cloud"
//! api_key = "..."
//! api_secret = "..."
//!
//! [durable_object]
//! endpoint = "https://objects.example.org"
//! bucket = "evidence"
//!
//! [local_vault]
//! root = "vault"
//! key_hex = "<64 hex chars>"
//! ```

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{ConfigIssue, ConfigValidator};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crypto::VaultKey;
use crate::errors::{Result, SetuError};

/// Upper bound accepted for any tier timeout
const MAX_TIMEOUT_MS: u64 = 10 * 60 * 1000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetuConfig {
    /// Content-addressed network tier
    pub content_network: ContentNetworkConfig,
    /// Bucket-style durable object tier
    pub durable_object: DurableObjectConfig,
    /// Sealed local vault tier
    pub local_vault: LocalVaultConfig,
    /// Record catalog
    pub catalog: CatalogConfig,
    /// Submission limits
    pub ingest: IngestConfig,
    /// Fallback retrieval behavior
    pub retrieval: RetrievalConfig,
    /// Ledger confirmation behavior
    pub anchor: AnchorConfig,
}

/// Pinning API plus public gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentNetworkConfig {
    /// Whether the tier takes part in ingestion and retrieval
    pub enabled: bool,
    /// Base URL of the pinning API
    pub api_url: String,
    /// Base URL of the retrieval gateway
    pub gateway_url: String,
    /// Pinning API key
    pub api_key: Option<SecretString>,
    /// Pinning API secret
    pub api_secret: Option<SecretString>,
    /// Content identifier version requested from the pinning service
    pub cid_version: u8,
    /// HTTP timeout per request
    pub timeout_ms: u64,
}

impl Default for ContentNetworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.pinata.cloud".to_string(),
            gateway_url: "https://gateway.pinata.cloud".to_string(),
            api_key: None,
            api_secret: None,
            cid_version: 1,
            timeout_ms: 30_000,
        }
    }
}

impl ContentNetworkConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Object store reached over HTTP with path-style addressing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurableObjectConfig {
    /// Whether the tier takes part in ingestion and retrieval
    pub enabled: bool,
    /// Base URL of the object store
    pub endpoint: Option<String>,
    /// Bucket holding the evidence objects
    pub bucket: Option<String>,
    /// Bearer token, if the store requires one
    pub access_token: Option<SecretString>,
    /// HTTP timeout per request
    pub timeout_ms: u64,
}

impl Default for DurableObjectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            bucket: None,
            access_token: None,
            timeout_ms: 30_000,
        }
    }
}

impl DurableObjectConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Sealed files on local disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalVaultConfig {
    /// Whether the tier takes part in ingestion and retrieval
    pub enabled: bool,
    /// Directory holding the sealed files
    pub root: PathBuf,
    /// AES-256 key, 64 hex characters
    pub key_hex: Option<SecretString>,
}

impl Default for LocalVaultConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: PathBuf::from("vault"),
            key_hex: None,
        }
    }
}

impl LocalVaultConfig {
    /// Parse the configured key
    pub fn key(&self) -> Result<VaultKey> {
        let hex = self
            .key_hex
            .as_ref()
            .ok_or_else(|| SetuError::config("local_vault.key_hex is not set"))?;
        VaultKey::from_hex(hex.expose())
    }
}

/// Where the filesystem catalog keeps its records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory with one JSON document per record
    pub root: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("catalog"),
        }
    }
}

/// Submission limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Most files accepted in one submission
    pub max_files_per_submission: usize,
    /// Files ingested at the same time within one submission
    pub max_concurrent_files: usize,
    /// Bound on each network or durable tier call
    pub remote_tier_timeout_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_files_per_submission: 20,
            max_concurrent_files: 4,
            remote_tier_timeout_ms: 60_000,
        }
    }
}

/// Fallback retrieval behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Treat bytes that do not match the recorded fingerprint as a tier failure
    pub verify_on_retrieve: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            verify_on_retrieve: true,
        }
    }
}

/// What a second ledger confirmation does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPolicy {
    /// Overwrite the previous reference
    #[default]
    LastWriteWins,
    /// Refuse once a concrete reference is stored
    RejectReconfirmation,
}

/// Ledger confirmation behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Policy for repeated confirmations
    pub policy: AnchorPolicy,
}

impl SetuConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SetuError::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SetuError::config(format!("Invalid TOML: {e}")))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SetuError::serialization(e.to_string()))
    }

    /// Override fields from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_env_vars(std::env::vars())
    }

    /// Override fields from `SETU_*` variables
    ///
    /// Recognized: `SETU_PINNING_API_URL`, `SETU_GATEWAY_URL`,
    /// `SETU_PINNING_API_KEY`, `SETU_PINNING_API_SECRET`,
    /// `SETU_OBJECT_ENDPOINT`, `SETU_OBJECT_BUCKET`, `SETU_OBJECT_TOKEN`,
    /// `SETU_VAULT_ROOT`, `SETU_VAULT_KEY`, `SETU_CATALOG_ROOT`.
    pub fn merge_env_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix("SETU_") else {
                continue;
            };
            match name {
                "PINNING_API_URL" => self.content_network.api_url = value,
                "GATEWAY_URL" => self.content_network.gateway_url = value,
                "PINNING_API_KEY" => self.content_network.api_key = Some(value.into()),
                "PINNING_API_SECRET" => self.content_network.api_secret = Some(value.into()),
                "OBJECT_ENDPOINT" => self.durable_object.endpoint = Some(value),
                "OBJECT_BUCKET" => self.durable_object.bucket = Some(value),
                "OBJECT_TOKEN" => self.durable_object.access_token = Some(value.into()),
                "VAULT_ROOT" => self.local_vault.root = PathBuf::from(value),
                "VAULT_KEY" => self.local_vault.key_hex = Some(value.into()),
                "CATALOG_ROOT" => self.catalog.root = PathBuf::from(value),
                other => tracing::debug!(variable = other, "ignoring unknown SETU_ variable"),
            }
        }
        Ok(())
    }

    /// Check every section, reporting all problems at once
    pub fn validate(&self) -> Result<()> {
        let mut validator = ConfigValidator::new();

        validator.custom(
            "tiers",
            self.content_network.enabled
                || self.durable_object.enabled
                || self.local_vault.enabled,
            "at least one tier must be enabled",
        );

        if self.content_network.enabled {
            let mut v = validator.section("content_network");
            let c = &self.content_network;
            v.url("api_url", &c.api_url)
                .url("gateway_url", &c.gateway_url)
                .required("api_key", c.api_key.as_ref().map(SecretString::expose))
                .required("api_secret", c.api_secret.as_ref().map(SecretString::expose))
                .range("cid_version", u64::from(c.cid_version), 0, 1)
                .range("timeout_ms", c.timeout_ms, 1, MAX_TIMEOUT_MS);
            validator.absorb(v);
        }

        if self.durable_object.enabled {
            let mut v = validator.section("durable_object");
            let d = &self.durable_object;
            v.required("endpoint", d.endpoint.as_deref())
                .required("bucket", d.bucket.as_deref())
                .range("timeout_ms", d.timeout_ms, 1, MAX_TIMEOUT_MS);
            if let Some(endpoint) = &d.endpoint {
                v.url("endpoint", endpoint);
            }
            if let Some(bucket) = &d.bucket {
                v.custom(
                    "bucket",
                    !bucket.contains('/'),
                    "bucket name must not contain '/'",
                );
            }
            validator.absorb(v);
        }

        if self.local_vault.enabled {
            let mut v = validator.section("local_vault");
            let key = self.local_vault.key_hex.as_ref().map(SecretString::expose);
            v.required("key_hex", key);
            if let Some(key) = key {
                v.custom(
                    "key_hex",
                    VaultKey::from_hex(key).is_ok(),
                    "must be 64 hex characters",
                );
            }
            validator.absorb(v);
        }

        let mut v = validator.section("ingest");
        v.range(
            "max_files_per_submission",
            self.ingest.max_files_per_submission as u64,
            1,
            1_000,
        )
        .range(
            "max_concurrent_files",
            self.ingest.max_concurrent_files as u64,
            1,
            256,
        )
        .range(
            "remote_tier_timeout_ms",
            self.ingest.remote_tier_timeout_ms,
            1,
            MAX_TIMEOUT_MS,
        );
        validator.absorb(v);

        validator.finish()
    }
}
