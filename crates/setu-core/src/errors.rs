//! Error types for the evidence store
//!
//! `SetuError` is the single foundation error used by configuration, catalog
//! backends and identifier parsing. Tier adapters report the narrower
//! [`TierError`], which the orchestrator always absorbs into its fallback and
//! partial-success logic.

use crate::types::TierKind;
use serde::{Deserialize, Serialize};
use std::{fmt, io};

/// Foundation error shared by configuration, catalogs and identifier parsing
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SetuError {
    /// Rejected identifier, key material or argument
    #[error("invalid value: {message}")]
    Invalid {
        /// What was rejected and why
        message: String,
    },

    /// Record, file or object is absent
    #[error("not found: {message}")]
    NotFound {
        /// What was looked up
        message: String,
    },

    /// An atomic update precondition did not hold
    #[error("conflict: {message}")]
    Conflict {
        /// The precondition that failed
        message: String,
    },

    /// Sealing or key handling failed
    #[error("crypto failure: {message}")]
    Crypto {
        /// Detail
        message: String,
    },

    /// A collaborator could not be reached
    #[error("network failure: {message}")]
    Network {
        /// Detail
        message: String,
    },

    /// A catalog document or config file did not (de)serialize
    #[error("encoding failure: {message}")]
    Serialization {
        /// Detail
        message: String,
    },

    /// Local disk I/O failed
    #[error("storage failure: {message}")]
    Storage {
        /// Detail
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("bad configuration: {message}")]
    Config {
        /// Every problem found, joined with `; `
        message: String,
    },

    /// Broken assumption inside the store
    #[error("internal failure: {message}")]
    Internal {
        /// Detail
        message: String,
    },
}

impl SetuError {
    /// [`SetuError::Invalid`]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// [`SetuError::NotFound`]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// [`SetuError::Conflict`]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// [`SetuError::Crypto`]
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// [`SetuError::Network`]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// [`SetuError::Serialization`]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// [`SetuError::Storage`]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// [`SetuError::Config`]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// [`SetuError::Internal`]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error reports a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for foundation operations
pub type Result<T> = std::result::Result<T, SetuError>;

impl From<io::Error> for SetuError {
    fn from(e: io::Error) -> Self {
        let message = e.to_string();
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound { message },
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => Self::Invalid { message },
            _ => Self::Storage { message },
        }
    }
}

impl From<serde_json::Error> for SetuError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

/// Failure to open a sealed blob
///
/// Kept separate from "not found": the bytes exist but cannot be read back
/// with the configured key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DecryptionError {
    /// Blob is shorter than the nonce plus authentication tag
    #[error("sealed blob truncated: {len} bytes, need at least {min}")]
    Truncated {
        /// Length of the blob that was supplied
        len: usize,
        /// Minimum length of a well-formed blob
        min: usize,
    },

    /// Authentication failed: wrong key or corrupted ciphertext
    #[error("sealed blob failed authentication (wrong key or corrupted data)")]
    Authentication,
}

/// Which side of a tier capability failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierOperation {
    /// `store` during ingestion
    Write,
    /// `fetch` during retrieval or audit
    Read,
}

impl fmt::Display for TierOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => f.write_str("write"),
            Self::Read => f.write_str("read"),
        }
    }
}

/// A single tier's failure
///
/// Never terminal on its own: ingestion records it as a missing location and
/// retrieval falls through to the next tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TierError {
    /// The tier rejected or failed a write
    #[error("{tier} tier write failed: {message}")]
    Write {
        /// Tier that failed
        tier: TierKind,
        /// Backend-specific failure description
        message: String,
    },

    /// The tier failed a read
    #[error("{tier} tier read failed: {message}")]
    Read {
        /// Tier that failed
        tier: TierKind,
        /// Backend-specific failure description
        message: String,
    },

    /// The tier has nothing at the given locator
    #[error("{tier} tier has no object at {locator}")]
    NotFound {
        /// Tier that was asked
        tier: TierKind,
        /// Locator that resolved to nothing
        locator: String,
    },

    /// The operation exceeded the caller-supplied bound
    #[error("{tier} tier {operation} timed out after {elapsed_ms} ms")]
    Timeout {
        /// Tier that timed out
        tier: TierKind,
        /// Operation that was in flight
        operation: TierOperation,
        /// The bound that was exceeded
        elapsed_ms: u64,
    },

    /// Stored bytes exist but could not be unsealed
    #[error("{tier} tier returned unreadable data: {source}")]
    Decryption {
        /// Tier that returned the blob
        tier: TierKind,
        /// Underlying vault failure
        #[source]
        source: DecryptionError,
    },

    /// Bytes came back but do not hash to the recorded fingerprint
    #[error("{tier} tier returned bytes with fingerprint {actual}, expected {expected}")]
    IntegrityMismatch {
        /// Tier that returned the bytes
        tier: TierKind,
        /// Fingerprint recorded at ingestion
        expected: String,
        /// Fingerprint of the returned bytes
        actual: String,
    },
}

impl TierError {
    /// Create a write failure
    pub fn write(tier: TierKind, message: impl Into<String>) -> Self {
        Self::Write {
            tier,
            message: message.into(),
        }
    }

    /// Create a read failure
    pub fn read(tier: TierKind, message: impl Into<String>) -> Self {
        Self::Read {
            tier,
            message: message.into(),
        }
    }

    /// Create a not-found failure
    pub fn not_found(tier: TierKind, locator: impl Into<String>) -> Self {
        Self::NotFound {
            tier,
            locator: locator.into(),
        }
    }

    /// The tier this error came from
    pub fn tier(&self) -> TierKind {
        match self {
            Self::Write { tier, .. }
            | Self::Read { tier, .. }
            | Self::NotFound { tier, .. }
            | Self::Timeout { tier, .. }
            | Self::Decryption { tier, .. }
            | Self::IntegrityMismatch { tier, .. } => *tier,
        }
    }

    /// Whether the failure happened on the write side
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Write { .. }
                | Self::Timeout {
                    operation: TierOperation::Write,
                    ..
                }
        )
    }
}
