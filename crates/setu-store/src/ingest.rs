//! Ingestion inputs and per-file outcomes

use serde::Serialize;
use setu_core::{EvidenceRecord, TierError};
use std::fmt;

use crate::error::EvidenceError;

/// One file as delivered by the upload transport
#[derive(Clone, PartialEq, Eq)]
pub struct EvidenceUpload {
    /// Original file name
    pub file_name: String,
    /// Content type reported by the client
    pub media_type: String,
    /// The file's bytes, unmodified
    pub bytes: Vec<u8>,
}

impl EvidenceUpload {
    /// Bundle a file for ingestion
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for EvidenceUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvidenceUpload")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A file that reached at least one tier
#[derive(Debug, Clone, Serialize)]
pub struct IngestedEvidence {
    /// The catalog entry as written
    pub record: EvidenceRecord,
    /// Tier failures absorbed while storing this file
    pub tier_failures: Vec<TierError>,
}

/// A file that could not be ingested
#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    /// File name as submitted
    pub file_name: String,
    /// Why it failed
    pub error: EvidenceError,
}

/// Outcome of one submission, in submission order
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Files now in the catalog
    pub succeeded: Vec<IngestedEvidence>,
    /// Files that were not stored anywhere
    pub failed: Vec<IngestFailure>,
}

impl IngestReport {
    /// Whether every file was ingested
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of files in the submission
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Whether the submission was empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
