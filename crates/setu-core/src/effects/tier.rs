//! Uniform put/get capability over one storage backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::TierError;
use crate::types::{CaseId, OfficerId, TierKind};

/// Everything a tier may use to place one file
#[derive(Debug, Clone, Copy)]
pub struct StoreRequest<'a> {
    /// Matter the file belongs to
    pub case_id: &'a CaseId,
    /// Submitting officer
    pub officer_id: &'a OfficerId,
    /// Original file name
    pub file_name: &'a str,
    /// Original content type
    pub media_type: &'a str,
    /// Ingestion time shared by all tiers for this file
    pub ingested_at: DateTime<Utc>,
    /// The original bytes
    pub bytes: &'a [u8],
}

/// One storage backend
///
/// `store` returns a locator that `fetch` later accepts unchanged; the
/// locator is what the catalog records for this tier.
#[async_trait]
pub trait EvidenceTier: Send + Sync {
    /// Which tier this is
    fn kind(&self) -> TierKind;

    /// Persist the bytes and return their locator
    async fn store(&self, request: StoreRequest<'_>) -> Result<String, TierError>;

    /// Read the bytes behind `locator`
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TierError>;
}
